// Generation error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Generation error code constants
///
/// Error code range: 2001-2006
pub struct GenerationErrorCodes {}

impl GenerationErrorCodes {
    /// Style name is not one of the supported styles
    pub const UNKNOWN_STYLE: i32 = 2001;

    /// Scale name is not one of the supported scales
    pub const UNKNOWN_SCALE: i32 = 2002;

    /// Key signature could not be parsed
    pub const UNKNOWN_KEY: i32 = 2003;

    /// Composition was cancelled by the caller
    pub const CANCELLED: i32 = 2004;

    /// Composition did not finish before the deadline
    pub const TIMED_OUT: i32 = 2005;

    /// Configuration could not be interpreted
    pub const INVALID_CONFIG: i32 = 2006;
}

/// Log a generation error with structured context
pub fn log_generation_error(err: &GenerationError, context: &str) {
    error!(
        "Generation error in {}: code={}, component=CompositionEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Generation-related errors
///
/// Out-of-range numeric parameters are clamped, not rejected, so the only
/// configuration errors are names that do not map onto a closed enum.
///
/// Error code ranges: 2001-2006
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Style name is not one of the supported styles
    UnknownStyle { value: String },

    /// Scale name is not one of the supported scales
    UnknownScale { value: String },

    /// Key signature could not be parsed
    UnknownKey { value: String },

    /// Composition was cancelled via its token
    Cancelled,

    /// Composition exceeded its deadline
    TimedOut { timeout_ms: u64 },

    /// Configuration document could not be interpreted
    InvalidConfig { reason: String },
}

impl ErrorCode for GenerationError {
    fn code(&self) -> i32 {
        match self {
            GenerationError::UnknownStyle { .. } => GenerationErrorCodes::UNKNOWN_STYLE,
            GenerationError::UnknownScale { .. } => GenerationErrorCodes::UNKNOWN_SCALE,
            GenerationError::UnknownKey { .. } => GenerationErrorCodes::UNKNOWN_KEY,
            GenerationError::Cancelled => GenerationErrorCodes::CANCELLED,
            GenerationError::TimedOut { .. } => GenerationErrorCodes::TIMED_OUT,
            GenerationError::InvalidConfig { .. } => GenerationErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            GenerationError::UnknownStyle { value } => format!(
                "Unknown style '{}' (expected classical, jazz, electronic, ambient or experimental)",
                value
            ),
            GenerationError::UnknownScale { value } => format!(
                "Unknown scale '{}' (expected major, minor, dorian, mixolydian, pentatonic or blues)",
                value
            ),
            GenerationError::UnknownKey { value } => {
                format!("Unknown key signature '{}'", value)
            }
            GenerationError::Cancelled => "Composition cancelled".to_string(),
            GenerationError::TimedOut { timeout_ms } => {
                format!("Composition timed out after {} ms", timeout_ms)
            }
            GenerationError::InvalidConfig { reason } => {
                format!("Invalid generation config: {}", reason)
            }
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GenerationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for GenerationError {}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_codes() {
        assert_eq!(
            GenerationError::UnknownStyle {
                value: "polka".to_string()
            }
            .code(),
            2001
        );
        assert_eq!(
            GenerationError::UnknownScale {
                value: "lydian".to_string()
            }
            .code(),
            2002
        );
        assert_eq!(
            GenerationError::UnknownKey {
                value: "H".to_string()
            }
            .code(),
            2003
        );
        assert_eq!(GenerationError::Cancelled.code(), 2004);
        assert_eq!(GenerationError::TimedOut { timeout_ms: 10 }.code(), 2005);
        assert_eq!(
            GenerationError::InvalidConfig {
                reason: "x".to_string()
            }
            .code(),
            2006
        );
    }

    #[test]
    fn test_generation_error_messages() {
        let err = GenerationError::UnknownStyle {
            value: "polka".to_string(),
        };
        assert!(err.message().contains("polka"));

        let err = GenerationError::TimedOut { timeout_ms: 250 };
        assert!(err.message().contains("250 ms"));
    }

    #[test]
    fn test_error_code_trait_object() {
        let err: &dyn ErrorCode = &GenerationError::Cancelled;
        assert_eq!(err.code(), GenerationErrorCodes::CANCELLED);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: GenerationError = json_err.into();
        assert_eq!(err.code(), GenerationErrorCodes::INVALID_CONFIG);
    }
}
