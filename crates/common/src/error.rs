//! Error types shared across PawTrace crates.

/// Top-level error type for PawTrace operations.
///
/// Only malformed input and invalid parameters are expected to reach a caller
/// from the analysis core. Degenerate data (all samples filtered, no events)
/// is a valid outcome, never an error.
#[derive(Debug, thiserror::Error)]
pub enum PawtraceError {
    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },
}

/// Result type alias using PawtraceError.
pub type PawtraceResult<T> = Result<T, PawtraceError>;

impl PawtraceError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    /// Whether the failure came from the caller's input contract rather than
    /// from the engine itself.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_are_classified() {
        assert!(PawtraceError::input("missing column x").is_caller_error());
        assert!(PawtraceError::config("even window").is_caller_error());
        assert!(!PawtraceError::processing("boom").is_caller_error());
    }

    #[test]
    fn test_display_includes_message() {
        let err = PawtraceError::input("missing column `likelihood`");
        assert_eq!(err.to_string(), "Input error: missing column `likelihood`");
    }
}
