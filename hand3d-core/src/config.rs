/// Pose tuning constants.
///
/// The damping factors and spread weights were tuned by eye. They are data,
/// not derived values, so they can be overridden from a JSON file.
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{HandError, Result};
use crate::hand::{FingerKind, JointIndex};

/// Constants used by the pose controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Multiplier on the bend angle for joint1, joint2, joint3.
    pub joint_damping: [f32; 3],
    /// Divisor on the wrist bend angle.
    pub wrist_bend_damping: f32,
    /// Degrees of fan per spread unit.
    pub spread_step_degrees: f32,
    /// Per-finger spread weight, thumb to small. Negative on the small-finger side.
    pub spread_weights: [f32; 5],
    /// Extra multiplier on the thumb's spread offset.
    pub thumb_spread_damping: f32,
    /// Vertical lift of the thumb per radian of spread.
    pub thumb_lift: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            joint_damping: [0.9, 0.7, 0.5],
            wrist_bend_damping: 2.0,
            spread_step_degrees: 2.0,
            spread_weights: [1.0, 1.0, 0.35, -0.35, -1.0],
            thumb_spread_damping: 0.5,
            thumb_lift: 0.5,
        }
    }
}

impl Tuning {
    pub fn joint_damping(&self, joint: JointIndex) -> f32 {
        self.joint_damping[joint.ordinal()]
    }

    pub fn spread_weight(&self, finger: FingerKind) -> f32 {
        self.spread_weights[finger as usize]
    }

    /// Parse and validate a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a JSON tuning file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&text)?;
        info!(path = %path.display(), "Loaded pose tuning");
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the controller cannot use.
    pub fn validate(&self) -> Result<()> {
        let mut factors = self
            .joint_damping
            .iter()
            .chain(self.spread_weights.iter())
            .chain([
                &self.wrist_bend_damping,
                &self.spread_step_degrees,
                &self.thumb_spread_damping,
                &self.thumb_lift,
            ]);
        if factors.any(|f| !f.is_finite()) {
            return Err(HandError::invalid_tuning("all factors must be finite"));
        }
        if self.wrist_bend_damping == 0.0 {
            return Err(HandError::invalid_tuning("wrist_bend_damping must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "joint_damping": [1.0, 0.5, 0.25] }"#).unwrap();
        assert_eq!(tuning.joint_damping, [1.0, 0.5, 0.25]);
        assert_eq!(tuning.wrist_bend_damping, Tuning::default().wrist_bend_damping);
        assert_eq!(tuning.joint_damping(JointIndex::Joint3), 0.25);
    }

    #[test]
    fn test_zero_wrist_damping_rejected() {
        let err = Tuning::from_json_str(r#"{ "wrist_bend_damping": 0.0 }"#).unwrap_err();
        assert!(matches!(err, HandError::InvalidTuning(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Tuning::from_json_str("{ joint_damping").unwrap_err();
        assert!(matches!(err, HandError::Config(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json_pretty().unwrap();
        assert_eq!(Tuning::from_json_str(&json).unwrap(), tuning);
    }

    #[test]
    fn test_small_finger_side_is_negative() {
        let tuning = Tuning::default();
        assert!(tuning.spread_weight(FingerKind::Index) > 0.0);
        assert!(tuning.spread_weight(FingerKind::Small) < 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/nonexistent/hand3d-tuning.json").unwrap_err();
        assert!(matches!(err, HandError::Io(_)));
    }
}
