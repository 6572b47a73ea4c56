// Spectral module - Frequency-domain feature extraction
//
// This module computes spectral features from byte magnitude arrays
// (0-255 per bin). Bin `i` of an `N`-bin array sits at
// `i * sample_rate / (2 * N)` Hz.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Spectral rolloff threshold (90% of cumulative magnitude)
const ROLLOFF_THRESHOLD: f32 = 0.9;

/// Upper edge of the bass band as a fraction of the bin count
const BASS_BAND_END: f32 = 0.1;

/// Upper edge of the mid band as a fraction of the bin count
const MID_BAND_END: f32 = 0.5;

/// Full-scale byte magnitude
const MAX_MAGNITUDE: f32 = 255.0;

/// Normalized energies of the three contiguous bands
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate the bins were computed at, in Hz
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Frequency in Hz of bin `index` in a spectrum of `bin_count` bins
    pub fn bin_frequency(&self, index: usize, bin_count: usize) -> f32 {
        if bin_count == 0 {
            return 0.0;
        }
        index as f32 * self.sample_rate as f32 / (2.0 * bin_count as f32)
    }

    /// Compute bass/mid/high band energies
    ///
    /// Bass is the first 10% of bins, mid the next 40%, high the remaining
    /// 50%. Each band is the mean of its bins divided by 255; an empty band
    /// reports 0.
    pub fn compute_band_energies(&self, spectrum: &[u8]) -> BandEnergies {
        let n = spectrum.len();
        let bass_end = (n as f32 * BASS_BAND_END) as usize;
        let mid_end = (n as f32 * MID_BAND_END) as usize;

        BandEnergies {
            bass: band_mean(&spectrum[..bass_end]),
            mid: band_mean(&spectrum[bass_end..mid_end]),
            high: band_mean(&spectrum[mid_end..]),
        }
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// # Returns
    /// Spectral centroid in Hz, or 0 for a silent spectrum
    pub fn compute_centroid(&self, spectrum: &[u8]) -> f32 {
        let n = spectrum.len();

        let (weighted_sum, magnitude_sum) = spectrum.iter().enumerate().fold(
            (0.0f64, 0.0f64),
            |(weighted, total), (i, &mag)| {
                let mag = mag as f64;
                (
                    weighted + self.bin_frequency(i, n) as f64 * mag,
                    total + mag,
                )
            },
        );

        if magnitude_sum > 0.0 {
            (weighted_sum / magnitude_sum) as f32
        } else {
            0.0
        }
    }

    /// Compute spectral rolloff (90% cumulative magnitude frequency)
    ///
    /// Scans upward from bin 0 and returns the frequency of the first bin at
    /// which the cumulative normalized magnitude reaches 90% of the total.
    ///
    /// # Returns
    /// Rolloff frequency in Hz, or 0 when the threshold is never reached
    pub fn compute_rolloff(&self, spectrum: &[u8]) -> f32 {
        let n = spectrum.len();
        let total: f64 = spectrum
            .iter()
            .map(|&mag| mag as f64 / MAX_MAGNITUDE as f64)
            .sum();

        if total <= 0.0 {
            return 0.0;
        }

        let threshold = ROLLOFF_THRESHOLD as f64 * total;
        let mut cumulative = 0.0;
        for (i, &mag) in spectrum.iter().enumerate() {
            cumulative += mag as f64 / MAX_MAGNITUDE as f64;
            if cumulative >= threshold {
                return self.bin_frequency(i, n);
            }
        }

        0.0
    }

    /// Estimate pitch from the dominant bin
    ///
    /// Only the lower half of the bins is searched. Ties keep the lowest
    /// bin. A silent lower half reports 0.
    pub fn estimate_pitch(&self, spectrum: &[u8]) -> f32 {
        let n = spectrum.len();
        let search = &spectrum[..n / 2];

        let mut best_index = 0;
        let mut best_magnitude = 0u8;
        for (i, &mag) in search.iter().enumerate() {
            if mag > best_magnitude {
                best_magnitude = mag;
                best_index = i;
            }
        }

        if best_magnitude == 0 {
            0.0
        } else {
            self.bin_frequency(best_index, n)
        }
    }
}

fn band_mean(band: &[u8]) -> f32 {
    if band.is_empty() {
        return 0.0;
    }
    let sum: u64 = band.iter().map(|&mag| mag as u64).sum();
    (sum as f32 / band.len() as f32 / MAX_MAGNITUDE).clamp(0.0, 1.0)
}
