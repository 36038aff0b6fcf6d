/// Rest-pose construction of the jointed hand
///
/// The hierarchy is fixed: Base → Palm → finger mount → joint1 → joint2 →
/// joint3 (no joint3 on the thumb). Every drawable segment is the shared
/// unit cylinder scaled per use. A node's own scale is part of its frame and
/// carries down to its children; its mesh shape does not.
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::FRAC_PI_8;
use tracing::info;

use crate::transform::{LocalTransform, Rotation, Transform};

/// The five digits, in slider order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerKind {
    Thumb,
    Index,
    Middle,
    Ring,
    Small,
}

impl FingerKind {
    pub const ALL: [FingerKind; 5] = [
        FingerKind::Thumb,
        FingerKind::Index,
        FingerKind::Middle,
        FingerKind::Ring,
        FingerKind::Small,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FingerKind::Thumb => "thumb",
            FingerKind::Index => "index",
            FingerKind::Middle => "middle",
            FingerKind::Ring => "ring",
            FingerKind::Small => "small",
        }
    }

    pub fn joint_count(self) -> usize {
        match self {
            FingerKind::Thumb => 2,
            _ => 3,
        }
    }

    /// Joints this finger actually has, base first
    pub fn joints(self) -> &'static [JointIndex] {
        &JointIndex::ALL[..self.joint_count()]
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Position of a joint along its finger, counted from the palm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointIndex {
    Joint1,
    Joint2,
    Joint3,
}

impl JointIndex {
    pub const ALL: [JointIndex; 3] = [JointIndex::Joint1, JointIndex::Joint2, JointIndex::Joint3];

    pub fn name(self) -> &'static str {
        match self {
            JointIndex::Joint1 => "joint1",
            JointIndex::Joint2 => "joint2",
            JointIndex::Joint3 => "joint3",
        }
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// Per-finger construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerDescriptor {
    /// Offset of joint1 from the palm centre
    pub anchor: [f32; 3],
    pub joint_height: f32,
    pub joint_radius: f32,
    /// Fixed tilt of the whole finger about the depth axis
    pub rest_tilt: f32,
}

impl FingerDescriptor {
    pub const fn new(anchor: [f32; 3], joint_height: f32, joint_radius: f32) -> Self {
        Self {
            anchor,
            joint_height,
            joint_radius,
            rest_tilt: 0.0,
        }
    }

    pub const fn tilted(self, rest_tilt: f32) -> Self {
        Self { rest_tilt, ..self }
    }
}

/// Thumb, index, middle, ring, small
pub const FINGER_TABLE: [FingerDescriptor; 5] = [
    FingerDescriptor::new([-2.2, 0.3, 0.0], 1.0, 0.4).tilted(FRAC_PI_8),
    FingerDescriptor::new([-1.5, 3.0, 0.0], 2.1, 0.4),
    FingerDescriptor::new([-0.5, 3.0, 0.0], 2.3, 0.4),
    FingerDescriptor::new([0.5, 3.0, 0.0], 2.0, 0.4),
    FingerDescriptor::new([1.5, 3.0, 0.0], 1.6, 0.4),
];

const BASE_OFFSET: [f32; 3] = [0.0, 0.5, 0.0];
const BASE_SHAPE: [f32; 3] = [1.0, 0.5, 1.0];
const PALM_OFFSET: [f32; 3] = [0.0, 2.5, 0.0];
/// Radius 2, height 4.5
const PALM_SHAPE: [f32; 3] = [2.0, 4.5 / 2.0, 2.0];
/// Widens and flattens the palm and the frame the fingers are anchored in
const PALM_SCALE: [f32; 3] = [1.5, 1.0, 0.8];
/// joint1 doubles the depth of itself and the joints above it
const KNUCKLE_SCALE: [f32; 3] = [1.0, 1.0, 2.0];

/// Identifies one node of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    Base,
    Palm,
    Mount(FingerKind),
    Joint(FingerKind, JointIndex),
}

/// A rigid node: its current local transform, the rest transform it was
/// built with, the scale its children inherit, and the scale of the unit
/// cylinder drawn at it (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub transform: LocalTransform,
    rest: LocalTransform,
    scale: Vector3<f32>,
    shape: Option<Vector3<f32>>,
}

impl Segment {
    fn solid(rest: LocalTransform, shape: [f32; 3]) -> Self {
        Self {
            transform: rest,
            rest,
            scale: Vector3::repeat(1.0),
            shape: Some(Vector3::from(shape)),
        }
    }

    fn group(rest: LocalTransform) -> Self {
        Self {
            transform: rest,
            rest,
            scale: Vector3::repeat(1.0),
            shape: None,
        }
    }

    fn scaled(self, scale: [f32; 3]) -> Self {
        Self {
            scale: Vector3::from(scale),
            ..self
        }
    }

    pub fn rest(&self) -> &LocalTransform {
        &self.rest
    }

    pub fn shape(&self) -> Option<Vector3<f32>> {
        self.shape
    }

    /// Scale of this node's frame, seen by its children too
    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Parent-from-node matrix: T · R · S
    pub fn local_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix() * Transform::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn is_at_rest(&self) -> bool {
        self.transform == self.rest
    }

    pub fn reset(&mut self) {
        self.transform = self.rest;
    }

    fn shape_matrix(&self) -> Option<Matrix4<f32>> {
        self.shape.map(|s| Transform::scale_matrix(s.x, s.y, s.z))
    }
}

/// One finger: a mount carrying the rest tilt, then 2 or 3 chained joints
#[derive(Debug, Clone, PartialEq)]
pub struct FingerChain {
    kind: FingerKind,
    descriptor: FingerDescriptor,
    pub mount: Segment,
    pub joints: Vec<Segment>,
}

impl FingerChain {
    fn build(kind: FingerKind, descriptor: FingerDescriptor) -> Self {
        let [x, y, z] = descriptor.anchor;
        let r = descriptor.joint_radius;
        let h = descriptor.joint_height;

        let mount = Segment::group(LocalTransform::identity().with_rotation(Rotation::about_z(descriptor.rest_tilt)));

        let joints = kind
            .joints()
            .iter()
            .map(|joint| match joint {
                JointIndex::Joint1 => {
                    Segment::solid(LocalTransform::at(x, y, z), [r, h / 2.0, r]).scaled(KNUCKLE_SCALE)
                }
                _ => Segment::solid(LocalTransform::at(0.0, h, 0.0), [r, h / 2.0, r]),
            })
            .collect();

        Self {
            kind,
            descriptor,
            mount,
            joints,
        }
    }

    pub fn kind(&self) -> FingerKind {
        self.kind
    }

    pub fn descriptor(&self) -> &FingerDescriptor {
        &self.descriptor
    }

    /// The first joint, attached at the anchor
    pub fn root(&self) -> &Segment {
        &self.joints[0]
    }

    pub fn joint(&self, joint: JointIndex) -> Option<&Segment> {
        self.joints.get(joint.ordinal())
    }

    pub(crate) fn joint_mut(&mut self, joint: JointIndex) -> Option<&mut Segment> {
        self.joints.get_mut(joint.ordinal())
    }
}

/// The whole hand hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub base: Segment,
    pub palm: Segment,
    fingers: [FingerChain; 5],
}

impl Hand {
    /// Build the rest pose from the shipped finger table
    pub fn build() -> Self {
        Self::build_from(&FINGER_TABLE)
    }

    /// Build the rest pose from a table ordered thumb, index, middle, ring, small
    pub fn build_from(table: &[FingerDescriptor; 5]) -> Self {
        let fingers = FingerKind::ALL.map(|kind| FingerChain::build(kind, table[kind.ordinal()]));

        let hand = Self {
            base: Segment::solid(LocalTransform::at(BASE_OFFSET[0], BASE_OFFSET[1], BASE_OFFSET[2]), BASE_SHAPE),
            palm: Segment::solid(LocalTransform::at(PALM_OFFSET[0], PALM_OFFSET[1], PALM_OFFSET[2]), PALM_SHAPE)
                .scaled(PALM_SCALE),
            fingers,
        };

        info!(
            segments = hand.segment_count(),
            joints = hand.fingers.iter().map(|f| f.joints.len()).sum::<usize>(),
            "Built hand rest pose"
        );
        hand
    }

    pub fn finger(&self, kind: FingerKind) -> &FingerChain {
        &self.fingers[kind.ordinal()]
    }

    pub(crate) fn finger_mut(&mut self, kind: FingerKind) -> &mut FingerChain {
        &mut self.fingers[kind.ordinal()]
    }

    pub fn fingers(&self) -> &[FingerChain; 5] {
        &self.fingers
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        match id {
            SegmentId::Base => Some(&self.base),
            SegmentId::Palm => Some(&self.palm),
            SegmentId::Mount(kind) => Some(&self.finger(kind).mount),
            SegmentId::Joint(kind, joint) => self.finger(kind).joint(joint),
        }
    }

    /// Every node with its id, parents before children
    pub fn segments(&self) -> Vec<(SegmentId, &Segment)> {
        let mut out = vec![(SegmentId::Base, &self.base), (SegmentId::Palm, &self.palm)];
        for finger in &self.fingers {
            out.push((SegmentId::Mount(finger.kind), &finger.mount));
            for (joint, segment) in finger.kind.joints().iter().zip(&finger.joints) {
                out.push((SegmentId::Joint(finger.kind, *joint), segment));
            }
        }
        out
    }

    /// Number of drawable segments
    pub fn segment_count(&self) -> usize {
        self.segments().iter().filter(|(_, s)| s.shape.is_some()).count()
    }

    /// Put every node back at its rest transform
    pub fn reset(&mut self) {
        self.base.reset();
        self.palm.reset();
        for finger in &mut self.fingers {
            finger.mount.reset();
            finger.joints.iter_mut().for_each(Segment::reset);
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.segments().iter().all(|(_, s)| s.is_at_rest())
    }

    /// World-from-node matrix of one node, with the scale its children
    /// inherit but without its mesh shape
    pub fn world_matrix(&self, id: SegmentId) -> Option<Matrix4<f32>> {
        let base = self.base.local_matrix();
        let palm = base * self.palm.local_matrix();
        match id {
            SegmentId::Base => Some(base),
            SegmentId::Palm => Some(palm),
            SegmentId::Mount(kind) => Some(palm * self.finger(kind).mount.local_matrix()),
            SegmentId::Joint(kind, joint) => {
                let finger = self.finger(kind);
                finger.joint(joint)?;
                let mut world = palm * finger.mount.local_matrix();
                for segment in &finger.joints[..=joint.ordinal()] {
                    world *= segment.local_matrix();
                }
                Some(world)
            }
        }
    }

    /// Model matrix of every drawable segment, ready for the unit cylinder
    pub fn world_segments(&self) -> Vec<(SegmentId, Matrix4<f32>)> {
        let base = self.base.local_matrix();
        let palm = base * self.palm.local_matrix();
        let mut out = Vec::with_capacity(16);

        let mut push = |id: SegmentId, world: Matrix4<f32>, segment: &Segment| {
            if let Some(shape) = segment.shape_matrix() {
                out.push((id, world * shape));
            }
        };

        push(SegmentId::Base, base, &self.base);
        push(SegmentId::Palm, palm, &self.palm);
        for finger in &self.fingers {
            let mut world = palm * finger.mount.local_matrix();
            for (joint, segment) in finger.kind.joints().iter().zip(&finger.joints) {
                world *= segment.local_matrix();
                push(SegmentId::Joint(finger.kind, *joint), world, segment);
            }
        }
        out
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_joint_counts() {
        let hand = Hand::build();
        for finger in hand.fingers() {
            let expected = if finger.kind() == FingerKind::Thumb { 2 } else { 3 };
            assert_eq!(finger.joints.len(), expected, "{}", finger.kind().name());
        }
        assert!(hand.segment(SegmentId::Joint(FingerKind::Thumb, JointIndex::Joint3)).is_none());
    }

    #[test]
    fn test_roots_sit_on_anchors() {
        let hand = Hand::build();
        for (finger, descriptor) in hand.fingers().iter().zip(FINGER_TABLE.iter()) {
            let position = finger.root().transform.position;
            assert_relative_eq!(position.x, descriptor.anchor[0]);
            assert_relative_eq!(position.y, descriptor.anchor[1]);
            assert_relative_eq!(position.z, descriptor.anchor[2]);
        }
    }

    #[test]
    fn test_thumb_tilt_on_mount_only() {
        let hand = Hand::build();
        assert_relative_eq!(hand.finger(FingerKind::Thumb).mount.transform.rotation.z, FRAC_PI_8);
        assert_relative_eq!(hand.finger(FingerKind::Index).mount.transform.rotation.z, 0.0);
    }

    #[test]
    fn test_joint_shapes() {
        let hand = Hand::build();
        let index = hand.finger(FingerKind::Index);
        let knuckle = index.root();
        let shape = knuckle.shape().unwrap();
        assert_relative_eq!(shape.x, 0.4);
        assert_relative_eq!(shape.y, 1.05);
        assert_relative_eq!(shape.z, 0.4);
        assert_relative_eq!(knuckle.scale().z, 2.0);
        let tip = index.joint(JointIndex::Joint3).unwrap();
        assert_relative_eq!(tip.shape().unwrap().z, 0.4);
        assert_relative_eq!(tip.scale().z, 1.0);
        assert_relative_eq!(index.joint(JointIndex::Joint2).unwrap().transform.position.y, 2.1);
    }

    #[test]
    fn test_segment_counts() {
        let hand = Hand::build();
        assert_eq!(hand.segments().len(), 2 + 5 + 14);
        assert_eq!(hand.segment_count(), 16);
        assert_eq!(hand.world_segments().len(), 16);
        assert!(hand.is_at_rest());
    }

    #[test]
    fn test_world_position_of_middle_tip() {
        let hand = Hand::build();
        let world = hand
            .world_matrix(SegmentId::Joint(FingerKind::Middle, JointIndex::Joint3))
            .unwrap();
        let p = world.transform_point(&Point3::origin());
        // anchor x widened by the palm; base 0.5 + palm 2.5 + anchor 3 + two joints of 2.3
        assert_relative_eq!(p.x, -0.75, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.5 + 2.5 + 3.0 + 4.6, epsilon = 1e-5);
    }

    #[test]
    fn test_mesh_shape_is_not_inherited() {
        let hand = Hand::build();
        let joint1 = hand
            .world_matrix(SegmentId::Joint(FingerKind::Index, JointIndex::Joint1))
            .unwrap();
        let joint2 = hand
            .world_matrix(SegmentId::Joint(FingerKind::Index, JointIndex::Joint2))
            .unwrap();
        let step = joint2.transform_point(&Point3::origin()) - joint1.transform_point(&Point3::origin());
        assert_relative_eq!(step.norm(), 2.1, epsilon = 1e-5);
    }

    #[test]
    fn test_frame_scale_carries_to_upper_joints() {
        let hand = Hand::build();
        for joint in JointIndex::ALL {
            let world = hand
                .world_matrix(SegmentId::Joint(FingerKind::Ring, joint))
                .unwrap();
            // palm depth 0.8 times knuckle depth 2
            let depth = world.transform_vector(&Vector3::z());
            assert_relative_eq!(depth.norm(), 1.6, epsilon = 1e-5);
            let width = world.transform_vector(&Vector3::x());
            assert_relative_eq!(width.norm(), 1.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_fingers_span_the_palm() {
        let hand = Hand::build();
        let x_of = |kind| {
            hand.world_matrix(SegmentId::Joint(kind, JointIndex::Joint1))
                .unwrap()
                .transform_point(&Point3::origin())
                .x
        };
        assert_relative_eq!(x_of(FingerKind::Index), -2.25, epsilon = 1e-5);
        assert_relative_eq!(x_of(FingerKind::Small), 2.25, epsilon = 1e-5);
    }

    #[test]
    fn test_thumb_sits_outside_the_palm() {
        let hand = Hand::build();
        let palm = hand
            .world_matrix(SegmentId::Palm)
            .unwrap()
            .transform_point(&Point3::origin());
        for joint in FingerKind::Thumb.joints() {
            let centre = hand
                .world_matrix(SegmentId::Joint(FingerKind::Thumb, *joint))
                .unwrap()
                .transform_point(&Point3::origin());
            let offset = centre - palm;
            // palm cross-section: radius 2 widened to 3, flattened to 1.6
            let ellipse = (offset.x / 3.0).powi(2) + (offset.z / 1.6).powi(2);
            assert!(ellipse > 1.0, "{} at {offset:?} is inside the palm", joint.name());
        }
    }

    #[test]
    fn test_reset_restores_rest() {
        let mut hand = Hand::build();
        hand.base.transform.rotation.y = 1.0;
        hand.finger_mut(FingerKind::Ring).joints[1].transform.position.z = 0.3;
        assert!(!hand.is_at_rest());
        hand.reset();
        assert_eq!(hand, Hand::build());
    }
}
