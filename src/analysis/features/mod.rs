// SpectralAnalyzer - per-tick feature extraction from byte frames
//
// This module turns one frequency-magnitude array and one time-domain array
// (both 0-255) into a feature snapshot. Every step is a bounded synchronous
// pass over the input; degenerate input produces zeros, never errors.
//
// Module organization:
// - types: Data structures (AudioFeatures, SpectralSnapshot)
// - fft: PCM to byte frame conversion (ByteSpectrum)
// - spectral: Frequency-domain features (bands, centroid, rolloff, pitch)
// - temporal: Time-domain features (ZCR, RMS)
// - mod.rs: Coordinator (SpectralAnalyzer)

mod fft;
mod spectral;
mod temporal;
mod types;

pub use fft::{ByteFrame, ByteSpectrum};
pub use spectral::BandEnergies;
pub use types::{AudioFeatures, SpectralSnapshot};

use spectral::SpectralFeatures;
use temporal::TemporalFeatures;

/// SpectralAnalyzer coordinates frequency- and time-domain extraction
pub struct SpectralAnalyzer {
    spectral_features: SpectralFeatures,
    temporal_features: TemporalFeatures,
    sample_rate: u32,
}

impl SpectralAnalyzer {
    /// Create a new SpectralAnalyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate the magnitude bins were computed at
    pub fn new(sample_rate: u32) -> Self {
        Self {
            spectral_features: SpectralFeatures::new(sample_rate),
            temporal_features: TemporalFeatures::new(),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Extract all beat-independent features from one frame
    ///
    /// # Arguments
    /// * `frequency` - Magnitude bins, 0-255
    /// * `time_domain` - Time-domain samples, 0-255 centered on 128
    pub fn analyze(&self, frequency: &[u8], time_domain: &[u8]) -> SpectralSnapshot {
        let bands = self.spectral_features.compute_band_energies(frequency);

        SpectralSnapshot {
            bass_energy: bands.bass,
            mid_energy: bands.mid,
            high_energy: bands.high,
            spectral_centroid: self.spectral_features.compute_centroid(frequency),
            spectral_rolloff: self.spectral_features.compute_rolloff(frequency),
            zero_crossing_rate: self.temporal_features.compute_zcr(time_domain),
            rms: self.temporal_features.compute_rms(time_domain),
            pitch: self.spectral_features.estimate_pitch(frequency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_as_zero_bins_and_midline_samples_yields_zero_features() {
        // Silence in byte form: empty spectrum, every sample at the 128 midline
        let analyzer = SpectralAnalyzer::new(44_100);
        let snapshot = analyzer.analyze(&[0u8; 1024], &[128u8; 1024]);

        assert_eq!(snapshot.bass_energy, 0.0);
        assert_eq!(snapshot.mid_energy, 0.0);
        assert_eq!(snapshot.high_energy, 0.0);
        assert_eq!(snapshot.spectral_centroid, 0.0);
        assert_eq!(snapshot.spectral_rolloff, 0.0);
        assert_eq!(snapshot.rms, 0.0);
        assert_eq!(snapshot.pitch, 0.0);
    }

    #[test]
    fn test_all_zero_time_domain_bytes_are_full_scale_negative() {
        // Byte 0 is -1.0 after centering, so RMS is 1.0 with no crossings.
        // Band energies still read zero from the empty spectrum.
        let analyzer = SpectralAnalyzer::new(44_100);
        let snapshot = analyzer.analyze(&[0u8; 256], &[0u8; 256]);

        assert!((snapshot.rms - 1.0).abs() < 1e-6);
        assert_eq!(snapshot.zero_crossing_rate, 0.0);
        assert_eq!(snapshot.bass_energy, 0.0);
        assert_eq!(snapshot.mid_energy, 0.0);
        assert_eq!(snapshot.high_energy, 0.0);
    }

    #[test]
    fn test_empty_buffers_are_not_an_error() {
        let analyzer = SpectralAnalyzer::new(44_100);
        let snapshot = analyzer.analyze(&[], &[]);
        assert_eq!(snapshot, SpectralSnapshot::default());
    }

    #[test]
    fn test_bright_spectrum_has_higher_centroid() {
        let analyzer = SpectralAnalyzer::new(44_100);
        let mut dark = vec![0u8; 512];
        let mut bright = vec![0u8; 512];
        for i in 0..50 {
            dark[i] = 200;
            bright[400 + i] = 200;
        }

        let dark_snapshot = analyzer.analyze(&dark, &[128u8; 512]);
        let bright_snapshot = analyzer.analyze(&bright, &[128u8; 512]);
        assert!(bright_snapshot.spectral_centroid > dark_snapshot.spectral_centroid);
        assert!(bright_snapshot.high_energy > dark_snapshot.high_energy);
    }
}
