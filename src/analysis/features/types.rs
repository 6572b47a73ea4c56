// Types module - Data structures for audio features
//
// This module defines the per-tick feature snapshot handed from the analyzer
// to visualization and generation collaborators.

use serde::{Deserialize, Serialize};

/// Features extracted from one analysis tick
///
/// Recreated every tick and passed by value; never mutated after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatures {
    /// Mean magnitude of the lowest 10% of bins, normalized to 0.0-1.0
    pub bass_energy: f32,

    /// Mean magnitude of bins 10%-50%, normalized to 0.0-1.0
    pub mid_energy: f32,

    /// Mean magnitude of the upper 50% of bins, normalized to 0.0-1.0
    pub high_energy: f32,

    /// Spectral centroid in Hz (magnitude-weighted mean frequency)
    ///
    /// Measures the "brightness" of the sound. Zero for a silent spectrum.
    pub spectral_centroid: f32,

    /// Spectral rolloff in Hz (90% cumulative magnitude threshold)
    pub spectral_rolloff: f32,

    /// Fraction of adjacent time-domain pairs crossing the 128 midline
    pub zero_crossing_rate: f32,

    /// Root-mean-square of the time-domain samples mapped to [-1, 1]
    pub rms: f32,

    /// Whether the adaptive beat threshold fired on this tick
    pub beat_detected: bool,

    /// Amount by which combined energy exceeded the adaptive threshold
    pub onset_strength: f32,

    /// Frequency of the strongest bin in the lower half of the spectrum, in Hz
    pub pitch: f32,
}

impl AudioFeatures {
    /// Sum of the three band energies, as tracked by the beat detector
    pub fn combined_energy(&self) -> f32 {
        self.bass_energy + self.mid_energy + self.high_energy
    }

    /// Overall energy: mean of the three band energies (0.0-1.0)
    pub fn energy(&self) -> f32 {
        self.combined_energy() / 3.0
    }
}

/// Frequency/time-domain features before beat tracking is applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralSnapshot {
    pub bass_energy: f32,
    pub mid_energy: f32,
    pub high_energy: f32,
    pub spectral_centroid: f32,
    pub spectral_rolloff: f32,
    pub zero_crossing_rate: f32,
    pub rms: f32,
    pub pitch: f32,
}

impl SpectralSnapshot {
    pub fn combined_energy(&self) -> f32 {
        self.bass_energy + self.mid_energy + self.high_energy
    }

    /// Attach beat-tracking results to produce the final feature snapshot
    pub fn with_beat(self, beat_detected: bool, onset_strength: f32) -> AudioFeatures {
        AudioFeatures {
            bass_energy: self.bass_energy,
            mid_energy: self.mid_energy,
            high_energy: self.high_energy,
            spectral_centroid: self.spectral_centroid,
            spectral_rolloff: self.spectral_rolloff,
            zero_crossing_rate: self.zero_crossing_rate,
            rms: self.rms,
            beat_detected,
            onset_strength,
            pitch: self.pitch,
        }
    }
}
