// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 1001-1004
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Signal source could not be opened
    pub const SOURCE_UNAVAILABLE: i32 = 1001;

    /// Signal data could not be decoded
    pub const DECODE_FAILED: i32 = 1002;

    /// Signal source has no more frames
    pub const SOURCE_EXHAUSTED: i32 = 1003;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 1004;
}

/// Log an analysis error with structured context
///
/// Emits a single error line carrying the numeric code, the component and the
/// human-readable message. Never panics.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=AudioAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// Degenerate buffers are never an error; these cover the signal-source
/// boundary and shared-state access only.
///
/// Error code ranges: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Signal source could not be opened (missing file, device unavailable)
    SourceUnavailable { reason: String },

    /// Signal data could not be decoded
    DecodeFailed { reason: String },

    /// Signal source has no more frames to deliver
    SourceExhausted,

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::SourceUnavailable { .. } => AnalysisErrorCodes::SOURCE_UNAVAILABLE,
            AnalysisError::DecodeFailed { .. } => AnalysisErrorCodes::DECODE_FAILED,
            AnalysisError::SourceExhausted => AnalysisErrorCodes::SOURCE_EXHAUSTED,
            AnalysisError::LockPoisoned { .. } => AnalysisErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::SourceUnavailable { reason } => {
                format!("Signal source unavailable: {}", reason)
            }
            AnalysisError::DecodeFailed { reason } => {
                format!("Failed to decode signal: {}", reason)
            }
            AnalysisError::SourceExhausted => "Signal source has no more frames".to_string(),
            AnalysisError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => AnalysisError::SourceUnavailable {
                reason: io.to_string(),
            },
            other => AnalysisError::DecodeFailed {
                reason: other.to_string(),
            },
        }
    }
}
