/// Slider channels and the registry that holds their current values.
///
/// Channels are a closed set of tagged ids. Slider id strings only appear at
/// the edges (status readout, pose scripts, the web binding) and are matched
/// exactly.
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HandError, Result};
use crate::hand::{FingerKind, Hand, JointIndex, SegmentId};
use crate::pose::PoseController;

/// A joint that exists: thumb joint3 cannot be named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bend {
    finger: FingerKind,
    joint: JointIndex,
}

impl Bend {
    pub fn new(finger: FingerKind, joint: JointIndex) -> Option<Self> {
        (joint.ordinal() < finger.joint_count()).then_some(Self { finger, joint })
    }

    pub fn finger(self) -> FingerKind {
        self.finger
    }

    pub fn joint(self) -> JointIndex {
        self.joint
    }

    const fn of(finger: FingerKind, joint: JointIndex) -> ChannelId {
        ChannelId::Bend(Bend { finger, joint })
    }
}

/// One slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Bend(Bend),
    WristBend,
    WristTwist,
    FingerSpread,
}

impl ChannelId {
    /// Every channel in slider order
    pub const ALL: [ChannelId; 17] = {
        use FingerKind::*;
        use JointIndex::*;
        [
            Bend::of(Thumb, Joint1),
            Bend::of(Thumb, Joint2),
            Bend::of(Index, Joint1),
            Bend::of(Index, Joint2),
            Bend::of(Index, Joint3),
            Bend::of(Middle, Joint1),
            Bend::of(Middle, Joint2),
            Bend::of(Middle, Joint3),
            Bend::of(Ring, Joint1),
            Bend::of(Ring, Joint2),
            Bend::of(Ring, Joint3),
            Bend::of(Small, Joint1),
            Bend::of(Small, Joint2),
            Bend::of(Small, Joint3),
            ChannelId::WristBend,
            ChannelId::FingerSpread,
            ChannelId::WristTwist,
        ]
    };

    pub fn bend(finger: FingerKind, joint: JointIndex) -> Option<Self> {
        Bend::new(finger, joint).map(ChannelId::Bend)
    }

    pub fn range(self) -> ChannelRange {
        match self {
            ChannelId::Bend(_) => ChannelRange::new(0.0, 45.0),
            ChannelId::WristBend => ChannelRange::new(-45.0, 45.0),
            ChannelId::WristTwist => ChannelRange::new(0.0, 360.0),
            ChannelId::FingerSpread => ChannelRange::new(0.0, 10.0),
        }
    }

    /// Increment for one key press
    pub fn step(self) -> f32 {
        match self {
            ChannelId::WristTwist => 5.0,
            _ => 1.0,
        }
    }

    /// Nodes whose transforms this channel writes
    pub fn targets(self) -> Vec<SegmentId> {
        match self {
            ChannelId::Bend(bend) => vec![SegmentId::Joint(bend.finger, bend.joint)],
            ChannelId::WristBend => vec![SegmentId::Palm],
            ChannelId::WristTwist => vec![SegmentId::Base],
            ChannelId::FingerSpread => FingerKind::ALL.iter().map(|&k| SegmentId::Mount(k)).collect(),
        }
    }

    fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|&id| id == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Bend(bend) => write!(f, "slider-{}-{}", bend.finger.name(), bend.joint.name()),
            ChannelId::WristBend => f.write_str("slider-wrist-bend"),
            ChannelId::WristTwist => f.write_str("slider-wrist-twist"),
            ChannelId::FingerSpread => f.write_str("slider-fingers"),
        }
    }
}

impl FromStr for ChannelId {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "slider-wrist-bend" => return Ok(ChannelId::WristBend),
            "slider-wrist-twist" => return Ok(ChannelId::WristTwist),
            "slider-fingers" => return Ok(ChannelId::FingerSpread),
            _ => {}
        }

        let (finger, joint) = s
            .strip_prefix("slider-")
            .and_then(|rest| rest.split_once('-'))
            .ok_or_else(|| HandError::unknown_channel(s))?;
        let finger = FingerKind::ALL.into_iter().find(|k| k.name() == finger);
        let joint = JointIndex::ALL.into_iter().find(|j| j.name() == joint);

        match (finger, joint) {
            (Some(finger), Some(joint)) => {
                ChannelId::bend(finger, joint).ok_or_else(|| HandError::unknown_channel(s))
            }
            _ => Err(HandError::unknown_channel(s)),
        }
    }
}

/// Numeric domain of a slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ChannelRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max, default: 0.0 }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Nearest value inside the range; NaN and infinities fall back to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    /// Position of `value` within the range, 0.0 to 1.0
    pub fn fraction(&self, value: f32) -> f32 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }
}

/// A slider bound to its id, with its current value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub id: ChannelId,
    pub range: ChannelRange,
    value: f32,
}

impl Channel {
    pub fn value(&self) -> f32 {
        self.value
    }

    /// "slider-index-joint2: 45"
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.id, self.value)
    }
}

/// All channels of one hand, driving it through a [`PoseController`]
#[derive(Debug, Clone)]
pub struct ChannelBank {
    channels: Vec<Channel>,
    controller: PoseController,
    last_changed: Option<ChannelId>,
}

impl ChannelBank {
    /// One channel per joint the hand was built with, then the wrist and
    /// spread channels.
    pub fn new(hand: &Hand, controller: PoseController) -> Self {
        let bends = hand
            .fingers()
            .iter()
            .flat_map(|finger| finger.kind().joints().iter().map(|&joint| (finger.kind(), joint)))
            .filter_map(|(finger, joint)| ChannelId::bend(finger, joint));
        let channels = bends
            .chain([ChannelId::WristBend, ChannelId::FingerSpread, ChannelId::WristTwist])
            .map(|id| {
                let range = id.range();
                Channel {
                    id,
                    range,
                    value: range.default,
                }
            })
            .collect();

        Self {
            channels,
            controller,
            last_changed: None,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn controller(&self) -> &PoseController {
        &self.controller
    }

    pub fn get(&self, id: ChannelId) -> &Channel {
        &self.channels[id.ordinal()]
    }

    pub fn value(&self, id: ChannelId) -> f32 {
        self.get(id).value
    }

    /// Clamp `value` into the channel's range, store it and pose the hand.
    /// Returns the value actually applied.
    pub fn set(&mut self, hand: &mut Hand, id: ChannelId, value: f32) -> f32 {
        let channel = &mut self.channels[id.ordinal()];
        let applied = channel.range.clamp(value);
        if applied != value {
            debug!(channel = %id, requested = value, applied, "Channel value clamped to range");
        }
        channel.value = applied;
        self.controller.apply(hand, id, applied);
        self.last_changed = Some(id);
        applied
    }

    /// Move a channel by a number of its steps
    pub fn nudge(&mut self, hand: &mut Hand, id: ChannelId, steps: f32) -> f32 {
        let target = self.value(id) + steps * id.step();
        self.set(hand, id, target)
    }

    /// Set a channel by its slider id
    pub fn set_by_name(&mut self, hand: &mut Hand, name: &str, value: f32) -> Result<f32> {
        let id = name.parse()?;
        Ok(self.set(hand, id, value))
    }

    pub fn status_line(&self, id: ChannelId) -> String {
        self.get(id).status_line()
    }

    /// Readout for the most recently changed channel
    pub fn last_status(&self) -> Option<String> {
        self.last_changed.map(|id| self.status_line(id))
    }

    /// Swap the controller and re-pose the hand from the current values
    pub fn set_controller(&mut self, hand: &mut Hand, controller: PoseController) {
        self.controller = controller;
        for channel in &self.channels {
            self.controller.apply(hand, channel.id, channel.value);
        }
    }

    /// All channels to their defaults, hand to its rest pose
    pub fn reset(&mut self, hand: &mut Hand) {
        for channel in &mut self.channels {
            channel.value = channel.range.default;
        }
        self.last_changed = None;
        hand.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;

    fn rig() -> (Hand, ChannelBank) {
        let hand = Hand::build();
        let bank = ChannelBank::new(&hand, PoseController::new(Tuning::default()));
        (hand, bank)
    }

    #[test]
    fn test_seventeen_channels_in_slider_order() {
        let (_, bank) = rig();
        let ids: Vec<ChannelId> = bank.channels().iter().map(|c| c.id).collect();
        assert_eq!(ids, ChannelId::ALL.to_vec());
        assert_eq!(ids.iter().filter(|id| matches!(id, ChannelId::Bend(_))).count(), 14);
    }

    #[test]
    fn test_slider_ids_round_trip() {
        for id in ChannelId::ALL {
            let name = id.to_string();
            assert_eq!(name.parse::<ChannelId>().unwrap(), id, "{name}");
        }
        assert_eq!(
            ChannelId::bend(FingerKind::Index, JointIndex::Joint2).unwrap().to_string(),
            "slider-index-joint2"
        );
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("slider-thumb-joint3".parse::<ChannelId>().is_err());
        assert!("slider-index-joint2x".parse::<ChannelId>().is_err());
        assert!("index-joint2".parse::<ChannelId>().is_err());
        assert!("slider-wrist".parse::<ChannelId>().is_err());
        assert!("xslider-fingers".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_thumb_joint3_does_not_exist() {
        assert!(Bend::new(FingerKind::Thumb, JointIndex::Joint3).is_none());
        assert!(Bend::new(FingerKind::Small, JointIndex::Joint3).is_some());
    }

    #[test]
    fn test_ranges() {
        assert_eq!(ChannelId::WristBend.range().min, -45.0);
        assert_eq!(ChannelId::WristTwist.range().max, 360.0);
        assert_eq!(ChannelId::FingerSpread.range().max, 10.0);
        for id in ChannelId::ALL {
            assert_eq!(id.range().default, 0.0);
        }
    }

    #[test]
    fn test_set_clamps_and_reports() {
        let (mut hand, mut bank) = rig();
        let id = ChannelId::bend(FingerKind::Ring, JointIndex::Joint1).unwrap();
        assert_eq!(bank.set(&mut hand, id, 90.0), 45.0);
        assert_eq!(bank.value(id), 45.0);
        assert_eq!(bank.last_status().as_deref(), Some("slider-ring-joint1: 45"));
    }

    #[test]
    fn test_nudge_uses_channel_step() {
        let (mut hand, mut bank) = rig();
        assert_eq!(bank.nudge(&mut hand, ChannelId::WristTwist, 2.0), 10.0);
        assert_eq!(bank.nudge(&mut hand, ChannelId::WristBend, -3.0), -3.0);
        assert_eq!(bank.nudge(&mut hand, ChannelId::FingerSpread, -1.0), 0.0);
    }

    #[test]
    fn test_set_by_name_unknown() {
        let (mut hand, mut bank) = rig();
        let err = bank.set_by_name(&mut hand, "slider-pinky-joint1", 3.0).unwrap_err();
        assert!(matches!(err, HandError::UnknownChannel(_)));
        assert!(hand.is_at_rest());
    }

    #[test]
    fn test_reset_returns_to_rest() {
        let (mut hand, mut bank) = rig();
        bank.set(&mut hand, ChannelId::WristTwist, 120.0);
        bank.set(&mut hand, ChannelId::FingerSpread, 4.0);
        bank.reset(&mut hand);
        assert!(hand.is_at_rest());
        assert!(bank.channels().iter().all(|c| c.value() == 0.0));
        assert!(bank.last_status().is_none());
    }

    #[test]
    fn test_non_finite_values_fall_back_to_default() {
        let (mut hand, mut bank) = rig();
        let range = ChannelId::WristTwist.range();
        assert_eq!(range.clamp(f32::NAN), 0.0);
        assert_eq!(range.clamp(f32::INFINITY), 0.0);

        bank.set(&mut hand, ChannelId::WristBend, 30.0);
        assert_eq!(bank.set(&mut hand, ChannelId::WristBend, f32::NAN), 0.0);
        assert_eq!(bank.status_line(ChannelId::WristBend), "slider-wrist-bend: 0");
        assert!(hand.palm.transform.rotation.z.is_finite());
        assert!(hand.is_at_rest());
    }

    #[test]
    fn test_range_fraction() {
        let range = ChannelId::WristBend.range();
        assert_eq!(range.fraction(0.0), 0.5);
        assert_eq!(range.fraction(-90.0), 0.0);
        assert!(range.contains(45.0));
        assert!(!range.contains(45.5));
    }
}
