// Temporal module - Time-domain feature extraction
//
// This module computes features directly from unsigned 8-bit time-domain
// samples centered on 128.

/// Midline of unsigned 8-bit time-domain samples
const MIDLINE: u8 = 128;

/// Temporal feature computation functions
pub struct TemporalFeatures;

impl TemporalFeatures {
    pub fn new() -> Self {
        Self
    }

    /// Compute zero-crossing rate (ZCR)
    ///
    /// Counts adjacent sample pairs that sit on opposite sides of the 128
    /// midline and divides by the number of pairs.
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0), 0 for fewer than two samples
    pub fn compute_zcr(&self, samples: &[u8]) -> f32 {
        if samples.len() < 2 {
            return 0.0;
        }

        let crossings = samples
            .windows(2)
            .filter(|pair| (pair[0] < MIDLINE) != (pair[1] < MIDLINE))
            .count();

        crossings as f32 / (samples.len() - 1) as f32
    }

    /// Compute root-mean-square level
    ///
    /// Samples are mapped to [-1, 1] via `(v - 128) / 128` first.
    pub fn compute_rms(&self, samples: &[u8]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f64 = samples
            .iter()
            .map(|&v| {
                let s = (v as f64 - MIDLINE as f64) / MIDLINE as f64;
                s * s
            })
            .sum();

        (sum_squares / samples.len() as f64).sqrt() as f32
    }
}

impl Default for TemporalFeatures {
    fn default() -> Self {
        Self::new()
    }
}
