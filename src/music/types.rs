// Types module - generation request and result data structures

use serde::{Deserialize, Serialize};

use crate::analysis::AudioFeatures;
use crate::error::GenerationError;

use super::theory::{PitchClass, ScaleType, Style};

/// Bounds applied by `GenerationConfig::sanitized`
pub const TEMPERATURE_RANGE: (f32, f32) = (0.1, 2.0);
pub const MAX_STEPS: usize = 1024;

/// A single symbolic note; times are in beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// MIDI pitch
    pub pitch: u8,
    /// Velocity (0.0-1.0)
    pub velocity: f32,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: u8, velocity: f32, start_time: f64, duration: f64) -> Self {
        Self {
            pitch,
            velocity: velocity.clamp(0.0, 1.0),
            start_time,
            end_time: start_time + duration,
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u8,
    pub beat_unit: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            beat_unit: 4,
        }
    }
}

/// A generated phrase; notes are ordered by non-decreasing start time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicalPhrase {
    pub notes: Vec<Note>,
    pub key: PitchClass,
    pub scale: ScaleType,
    /// Tempo in beats per minute
    pub tempo: f32,
    pub time_signature: TimeSignature,
    pub style: Style,
}

impl MusicalPhrase {
    /// Create an empty phrase carrying the config's key, scale and style
    pub fn for_config(config: &GenerationConfig) -> Self {
        Self {
            notes: Vec::new(),
            key: config.key_signature,
            scale: config.scale_type,
            tempo: config.style.tempo(),
            time_signature: TimeSignature::default(),
            style: config.style,
        }
    }

    /// End of the last sounding note, in beats
    pub fn length_beats(&self) -> f64 {
        self.notes
            .iter()
            .map(|note| note.end_time)
            .fold(0.0, f64::max)
    }

    /// Stable sort by start time, keeping the in-phrase ordering invariant
    pub(crate) fn sort_by_start(&mut self) {
        self.notes
            .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }
}

/// Parameters of one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Randomness (0.1-2.0); also the probability of a Markov draw
    pub temperature: f32,
    /// Note-count budget
    pub steps: usize,
    pub key_signature: PitchClass,
    pub scale_type: ScaleType,
    pub style: Style,
    /// 0.0-1.0
    pub rhythm_complexity: f32,
    /// 0.0-1.0
    pub harmonic_complexity: f32,
    pub audio_analysis: Option<AudioFeatures>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            steps: 32,
            key_signature: PitchClass::C,
            scale_type: ScaleType::Major,
            style: Style::Classical,
            rhythm_complexity: 0.5,
            harmonic_complexity: 0.3,
            audio_analysis: None,
        }
    }
}

impl GenerationConfig {
    /// Parse a JSON config document; unknown style/scale/key names are rejected
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str::<GenerationConfig>(json)?.sanitized())
    }

    /// Clamp numeric parameters into their documented ranges
    ///
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = GenerationConfig::default();

        let clamp = |value: f32, fallback: f32, low: f32, high: f32| {
            if value.is_finite() {
                value.clamp(low, high)
            } else {
                fallback
            }
        };

        let temperature = clamp(
            self.temperature,
            defaults.temperature,
            TEMPERATURE_RANGE.0,
            TEMPERATURE_RANGE.1,
        );
        let rhythm_complexity = clamp(self.rhythm_complexity, defaults.rhythm_complexity, 0.0, 1.0);
        let harmonic_complexity = clamp(
            self.harmonic_complexity,
            defaults.harmonic_complexity,
            0.0,
            1.0,
        );
        let steps = self.steps.clamp(1, MAX_STEPS);

        if temperature != self.temperature
            || rhythm_complexity != self.rhythm_complexity
            || harmonic_complexity != self.harmonic_complexity
            || steps != self.steps
        {
            log::debug!(
                "[GenerationConfig] Clamped parameters: temperature {} -> {}, steps {} -> {}",
                self.temperature,
                temperature,
                self.steps,
                steps
            );
        }

        self.temperature = temperature;
        self.rhythm_complexity = rhythm_complexity;
        self.harmonic_complexity = harmonic_complexity;
        self.steps = steps;
        self
    }

    /// Audio-derived influence terms, neutral when no analysis is attached
    pub fn influence(&self) -> AudioInfluence {
        self.audio_analysis
            .map(AudioInfluence::from_features)
            .unwrap_or_default()
    }
}

/// Normalized audio influence terms used by every generator
///
/// Missing or malformed analysis yields 0.5 for every term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfluence {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub energy: f32,
    pub present: bool,
}

impl Default for AudioInfluence {
    fn default() -> Self {
        Self {
            bass: 0.5,
            mid: 0.5,
            treble: 0.5,
            energy: 0.5,
            present: false,
        }
    }
}

impl AudioInfluence {
    pub fn from_features(features: AudioFeatures) -> Self {
        let term = |value: f32| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.5
            }
        };

        Self {
            bass: term(features.bass_energy),
            mid: term(features.mid_energy),
            treble: term(features.high_energy),
            energy: term(features.energy()),
            present: true,
        }
    }
}

/// Clamp a computed pitch into an inclusive MIDI range
pub(crate) fn clamp_pitch(pitch: i32, low: u8, high: u8) -> u8 {
    pitch.clamp(low as i32, high as i32) as u8
}
