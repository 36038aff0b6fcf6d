/// Hand3D Core Library - Jointed hand model and pose channels
///
/// This library builds the rest-pose hierarchy of a hand from scaled unit
/// cylinders, maps slider channels onto its joint transforms, and provides
/// the geometry and projection used by the frontends.

pub mod channel;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hand;
pub mod pose;
pub mod projection;
pub mod script;
pub mod transform;

// Re-export commonly used types
pub use channel::{Bend, Channel, ChannelBank, ChannelId, ChannelRange};
pub use config::Tuning;
pub use error::{HandError, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use hand::{FingerChain, FingerDescriptor, FingerKind, Hand, JointIndex, Segment, SegmentId, FINGER_TABLE};
pub use pose::PoseController;
pub use projection::{Camera, ProjectionMode};
pub use script::PoseScript;
pub use transform::{LocalTransform, Rotation, Transform};
