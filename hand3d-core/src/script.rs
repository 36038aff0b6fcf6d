/// Pose scripts: a replayable list of slider events.
///
/// ```text
/// # loose fist
/// slider-index-joint1 = 30
/// slider-index-joint2: 45
/// slider-wrist-twist = 90
/// ```
use nom::{
    bytes::complete::take_while1,
    character::complete::{one_of, space0},
    combinator::all_consuming,
    number::complete::float,
    sequence::{delimited, separated_pair},
    IResult,
};
use std::path::Path;
use tracing::{info, warn};

use crate::channel::{ChannelBank, ChannelId};
use crate::error::{HandError, Result};
use crate::hand::Hand;

/// Slider events in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseScript {
    pub entries: Vec<(ChannelId, f32)>,
}

impl PoseScript {
    /// Parse a script; errors name the 1-based line
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (index, raw) in input.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let (name, value) = match all_consuming(parse_assignment)(line) {
                Ok((_, pair)) => pair,
                Err(_) => {
                    return Err(HandError::script(
                        index + 1,
                        format!("expected `<slider-id> = <number>`, found `{line}`"),
                    ))
                }
            };
            let id = name
                .parse::<ChannelId>()
                .map_err(|e| HandError::script(index + 1, e.to_string()))?;
            if !value.is_finite() {
                return Err(HandError::script(index + 1, format!("`{name}` needs a finite value, found {value}")));
            }
            entries.push((id, value));
        }

        Ok(Self { entries })
    }

    /// Read and parse a script file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let script = Self::parse(&text)?;
        info!(path = %path.display(), events = script.entries.len(), "Loaded pose script");
        Ok(script)
    }

    /// Replay every event in order through the bank, which clamps values
    pub fn apply(&self, bank: &mut ChannelBank, hand: &mut Hand) {
        for &(id, value) in &self.entries {
            let applied = bank.set(hand, id, value);
            if applied != value {
                warn!(channel = %id, requested = value, applied, "Pose script value outside slider range");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_assignment(input: &str) -> IResult<&str, (&str, f32)> {
    separated_pair(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        delimited(space0, one_of("=:"), space0),
        float,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{FingerKind, JointIndex};
    use crate::pose::PoseController;

    #[test]
    fn test_parse_entries_and_comments() {
        let script = PoseScript::parse(
            "# fist\n\nslider-index-joint1 = 30\n  slider-wrist-bend:-12.5  # tilt\nslider-fingers=4\n",
        )
        .unwrap();
        assert_eq!(
            script.entries,
            vec![
                (ChannelId::bend(FingerKind::Index, JointIndex::Joint1).unwrap(), 30.0),
                (ChannelId::WristBend, -12.5),
                (ChannelId::FingerSpread, 4.0),
            ]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = PoseScript::parse("slider-fingers = 2\nslider-fingers = abc\n").unwrap_err();
        assert!(matches!(err, HandError::Script { line: 2, .. }));
    }

    #[test]
    fn test_unknown_channel_in_script() {
        let err = PoseScript::parse("\n\nslider-thumb-joint3 = 10").unwrap_err();
        match err {
            HandError::Script { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("slider-thumb-joint3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_value_is_a_line_error() {
        for text in ["slider-wrist-twist = nan", "slider-fingers = 2\nslider-wrist-bend: -inf"] {
            let err = PoseScript::parse(text).unwrap_err();
            assert!(matches!(err, HandError::Script { .. }), "{text}");
        }
        let err = PoseScript::parse("slider-fingers = 2\nslider-fingers = inf").unwrap_err();
        assert!(matches!(err, HandError::Script { line: 2, .. }));
    }

    #[test]
    fn test_empty_script() {
        assert!(PoseScript::parse("# nothing\n   \n").unwrap().is_empty());
    }

    #[test]
    fn test_apply_replays_in_order() {
        let mut hand = Hand::build();
        let mut bank = ChannelBank::new(&hand, PoseController::default());
        let script = PoseScript::parse("slider-wrist-twist = 90\nslider-wrist-twist = 400\n").unwrap();
        script.apply(&mut bank, &mut hand);
        assert_eq!(bank.value(ChannelId::WristTwist), 360.0);
        assert_eq!(bank.last_status().as_deref(), Some("slider-wrist-twist: 360"));
    }
}
