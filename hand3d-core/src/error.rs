/// Error types for hand3d-core.
///
/// Building the hand and applying channel values cannot fail; only the text
/// and file inputs (tuning files, pose scripts, channel ids) can.
use thiserror::Error;

/// Errors from loading configuration or parsing external input.
#[derive(Debug, Error)]
pub enum HandError {
    /// Reading a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tuning file was not valid JSON for [`crate::Tuning`].
    #[error("invalid tuning file: {0}")]
    Config(#[from] serde_json::Error),

    /// A tuning value is unusable.
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// No channel has this slider id.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// A pose script line could not be parsed.
    #[error("pose script line {line}: {message}")]
    Script {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
}

impl HandError {
    /// Creates an invalid tuning error.
    #[must_use]
    pub fn invalid_tuning(reason: impl Into<String>) -> Self {
        Self::InvalidTuning(reason.into())
    }

    /// Creates an unknown channel error.
    #[must_use]
    pub fn unknown_channel(id: impl Into<String>) -> Self {
        Self::UnknownChannel(id.into())
    }

    /// Creates a pose script error.
    #[must_use]
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }
}

/// Result type for hand3d-core operations.
pub type Result<T> = std::result::Result<T, HandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_unknown_channel() {
        let err = HandError::unknown_channel("slider-thumb-joint3");
        assert!(err.to_string().contains("unknown channel"));
        assert!(err.to_string().contains("slider-thumb-joint3"));
    }

    #[test]
    fn error_script_has_line() {
        let err = HandError::script(7, "expected a number");
        assert_eq!(err.to_string(), "pose script line 7: expected a number");
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = HandError::from(json_err);
        assert!(err.to_string().starts_with("invalid tuning file"));
    }
}
