// Error types for the resonance core
//
// This module defines structured error types for signal analysis and music
// generation, each carrying a stable numeric code for callers that need to
// branch on failures programmatically.

mod analysis;
mod generation;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use generation::{log_generation_error, GenerationError, GenerationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the analyzer and the composition engine.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
