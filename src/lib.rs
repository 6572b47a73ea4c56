// Resonance Core - audio-reactive procedural composition
// Per-tick spectral analysis feeding four seeded phrase generators

// Module declarations
pub mod analysis;
pub mod capture;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod music;
pub mod playback;

// Re-exports for convenience
pub use analysis::{AudioAnalyzer, AudioFeatures, BeatDetector, SpectralAnalyzer};
pub use capture::{SignalSource, ToneSource, WavFileSource};
pub use config::AppConfig;
pub use context::AppContext;
pub use engine::{CancelToken, Composition, CompositionEngine};
pub use error::{AnalysisError, ErrorCode, GenerationError};
pub use music::{GenerationConfig, MusicalPhrase, Note, PitchClass, ScaleType, Style};
pub use playback::{EventRecorder, InstrumentKind, PlaybackSink, ScheduledEvent};
