/// Maps channel values onto the hand's local transforms.
///
/// Every write starts from the segment's rest transform, so applying a value
/// is an assignment: repeating it changes nothing and earlier values leave no
/// trace. Bends and the wrist bend drive the rotation about the depth axis and
/// the depth offset with the same scaled radian value.
use tracing::debug;

use crate::channel::{Bend, ChannelId};
use crate::config::Tuning;
use crate::hand::{FingerKind, Hand, Segment};

/// Applies channel values to a [`Hand`] with a fixed set of constants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseController {
    tuning: Tuning,
}

impl PoseController {
    pub fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Pose `hand` for one channel. `value` is expected inside the
    /// channel's range and is not re-checked here.
    pub fn apply(&self, hand: &mut Hand, id: ChannelId, value: f32) {
        match id {
            ChannelId::Bend(bend) => self.apply_bend(hand, bend, value),
            ChannelId::WristBend => curl(&mut hand.palm, self.wrist_bend_offset(value)),
            ChannelId::WristTwist => {
                let rest = *hand.base.rest();
                hand.base.transform.rotation.y = rest.rotation.y + value.to_radians();
            }
            ChannelId::FingerSpread => self.apply_spread(hand, value),
        }
        debug!(channel = %id, value, "Applied channel");
    }

    /// Scaled radians for a joint bend
    pub fn bend_offset(&self, bend: Bend, degrees: f32) -> f32 {
        degrees.to_radians() * self.tuning.joint_damping(bend.joint())
    }

    /// Scaled radians for the wrist, opposite in sign to the finger bends
    pub fn wrist_bend_offset(&self, degrees: f32) -> f32 {
        -degrees.to_radians() / self.tuning.wrist_bend_damping
    }

    /// Angular offset of one finger for a spread value
    pub fn spread_offset(&self, finger: FingerKind, value: f32) -> f32 {
        let base = (value * self.tuning.spread_step_degrees).to_radians();
        let offset = base * self.tuning.spread_weight(finger);
        match finger {
            FingerKind::Thumb => offset * self.tuning.thumb_spread_damping,
            _ => offset,
        }
    }

    fn apply_bend(&self, hand: &mut Hand, bend: Bend, degrees: f32) {
        let offset = self.bend_offset(bend, degrees);
        if let Some(segment) = hand.finger_mut(bend.finger()).joint_mut(bend.joint()) {
            curl(segment, offset);
        }
    }

    fn apply_spread(&self, hand: &mut Hand, value: f32) {
        for finger in FingerKind::ALL {
            let offset = self.spread_offset(finger, value);
            let mount = &mut hand.finger_mut(finger).mount;
            let rest = *mount.rest();

            mount.transform.rotation.z = rest.rotation.z + offset;
            mount.transform.position.x = rest.position.x - offset;
            if finger == FingerKind::Thumb {
                mount.transform.position.y = rest.position.y + offset.abs() * self.tuning.thumb_lift;
            }
        }
    }
}

/// Same value into the depth-axis rotation and the depth offset
fn curl(segment: &mut Segment, offset: f32) {
    let rest = *segment.rest();
    segment.transform.rotation.z = rest.rotation.z + offset;
    segment.transform.position.z = rest.position.z + offset;
}
