// BeatDetector - adaptive-threshold beat detection on combined band energy
//
// Algorithm:
// 1. Append the tick's combined energy (bass + mid + high) to a rolling
//    history, evicting the oldest value once the history is full
// 2. Compute mean and population variance over the history
// 3. threshold = mean + multiplier * sqrt(variance)
// 4. beat = energy > threshold AND energy > absolute floor
// 5. onset strength = max(0, energy - threshold)
//
// There is no refractory period beyond the smoothing of the rolling window.

use std::collections::VecDeque;

use crate::config::BeatDetectionConfig;

/// Differences smaller than this are treated as equality when comparing
/// energy against the threshold, so a flat history never fires.
const COMPARISON_EPSILON: f64 = 1e-9;

/// Result of observing one tick's energy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatState {
    pub detected: bool,
    pub strength: f32,
    pub threshold: f32,
}

/// BeatDetector tracks a rolling energy history with an adaptive threshold
pub struct BeatDetector {
    history: VecDeque<f64>,
    history_len: usize,
    stddev_multiplier: f64,
    energy_floor: f64,
}

impl BeatDetector {
    /// Create a detector with the default 10-tick history, 2σ threshold and 0.1 floor
    pub fn new() -> Self {
        Self::with_config(BeatDetectionConfig::default())
    }

    /// Create a detector with explicit configuration parameters
    pub fn with_config(config: BeatDetectionConfig) -> Self {
        let history_len = config.history_len.max(1);
        Self {
            history: VecDeque::with_capacity(history_len + 1),
            history_len,
            stddev_multiplier: config.stddev_multiplier.max(0.0) as f64,
            energy_floor: config.energy_floor as f64,
        }
    }

    /// Observe one tick's combined energy
    ///
    /// # Arguments
    /// * `combined_energy` - bass + mid + high energy for the tick
    ///
    /// # Returns
    /// Beat flag, onset strength and the threshold the energy was compared to
    pub fn observe(&mut self, combined_energy: f32) -> BeatState {
        let energy = if combined_energy.is_finite() {
            combined_energy as f64
        } else {
            0.0
        };

        self.history.push_back(energy);
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }

        let count = self.history.len() as f64;
        let mean = self.history.iter().sum::<f64>() / count;
        let variance = self
            .history
            .iter()
            .map(|&e| (e - mean) * (e - mean))
            .sum::<f64>()
            / count;
        let threshold = mean + self.stddev_multiplier * variance.sqrt();

        let excess = energy - threshold;
        let excess = if excess.abs() < COMPARISON_EPSILON {
            0.0
        } else {
            excess
        };

        BeatState {
            detected: excess > 0.0 && energy > self.energy_floor,
            strength: excess.max(0.0) as f32,
            threshold: threshold as f32,
        }
    }

    /// Number of energies currently in the history
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new()
    }
}
