//! Engine module housing composition orchestration.
//!
//! `CompositionEngine` (`core`) fans a generation request out to the four
//! phrase generators and joins the results; `CancelToken` (`cancel`) lets the
//! caller abort a pending join.

pub mod cancel;
pub mod core;

pub use cancel::CancelToken;
pub use core::{Composition, CompositionEngine};
