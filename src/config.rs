//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. The beat detector's
//! threshold constants, the byte-spectrum front-end and the composition
//! defaults can all be adjusted via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub beat_detection: BeatDetectionConfig,
    pub generation: GenerationSettings,
}

/// Signal front-end parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate the bins are interpreted against, in Hz
    pub sample_rate: u32,
    /// FFT window size in samples (bin count = fft_size / 2)
    pub fft_size: usize,
    /// Analysis ticks per second
    pub tick_rate_hz: f32,
    /// Magnitude (dB) mapped to byte value 0
    pub min_decibels: f32,
    /// Magnitude (dB) mapped to byte value 255
    pub max_decibels: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            fft_size: 2048,
            tick_rate_hz: 60.0,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalysisConfig {
    /// Number of frequency bins (and time-domain samples) per frame
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2).max(1)
    }

    /// Number of PCM samples between consecutive ticks
    pub fn hop_size(&self) -> usize {
        let tick_rate = if self.tick_rate_hz > 0.0 {
            self.tick_rate_hz
        } else {
            60.0
        };
        ((self.sample_rate as f32 / tick_rate) as usize).max(1)
    }
}

/// Adaptive beat threshold parameters
///
/// The multiplier and floor have no documented derivation; they are kept
/// tunable so they can be recalibrated against real signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatDetectionConfig {
    /// Number of combined-energy values kept in the rolling history
    pub history_len: usize,
    /// Standard deviations above the mean required for a beat
    pub stddev_multiplier: f32,
    /// Absolute combined-energy floor below which no beat fires
    pub energy_floor: f32,
}

impl Default for BeatDetectionConfig {
    fn default() -> Self {
        Self {
            history_len: 10,
            stddev_multiplier: 2.0,
            energy_floor: 0.1,
        }
    }
}

/// Composition defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Seed used when the caller does not supply one
    pub seed: u64,
    /// Deadline for a full four-generator composition, if any
    pub timeout_ms: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            timeout_ms: Some(2000),
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// its JSON is invalid (a warning is logged in both cases).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default asset location
    pub fn load() -> Self {
        Self::load_from_file("assets/composer_config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.beat_detection.history_len, 10);
        assert_eq!(config.beat_detection.stddev_multiplier, 2.0);
        assert_eq!(config.beat_detection.energy_floor, 0.1);
        assert_eq!(config.analysis.bin_count(), 1024);
        assert_eq!(config.generation.seed, 42);
    }

    #[test]
    fn test_hop_size_follows_tick_rate() {
        let config = AnalysisConfig {
            sample_rate: 48_000,
            tick_rate_hz: 60.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.hop_size(), 800);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.analysis.fft_size, config.analysis.fft_size);
        assert_eq!(
            parsed.beat_detection.energy_floor,
            config.beat_detection.energy_floor
        );
        assert_eq!(parsed.generation.timeout_ms, config.generation.timeout_ms);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "beat_detection": { "stddev_multiplier": 1.5 } }"#)
                .unwrap();
        assert_eq!(parsed.beat_detection.stddev_multiplier, 1.5);
        assert_eq!(parsed.beat_detection.history_len, 10);
        assert_eq!(parsed.analysis.sample_rate, 44_100);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/composer_config.json");
        assert_eq!(config.generation.seed, 42);
    }
}
