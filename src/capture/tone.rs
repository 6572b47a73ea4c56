//! ToneSource - deterministic synthetic signal for tests and demos
//!
//! Produces a steady sine and, optionally, periodic broadband noise bursts
//! that read as percussive hits to the beat detector. Noise comes from a
//! fixed-seed RNG so every run yields the same frames.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{copy_frame, PcmWindow, SignalSource};
use crate::config::AnalysisConfig;
use crate::error::{log_analysis_error, AnalysisError};

/// Seed for burst noise
const BURST_NOISE_SEED: u64 = 42;

/// Periodic noise burst layered on top of the tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPattern {
    /// Tick of the first burst
    pub offset_ticks: u64,
    /// Ticks between burst onsets
    pub every_ticks: u64,
    /// Burst length in ticks
    pub length_ticks: u64,
    /// Peak noise amplitude (0.0-1.0)
    pub amplitude: f32,
}

impl BurstPattern {
    fn is_active(&self, tick: u64) -> bool {
        self.every_ticks > 0
            && tick >= self.offset_ticks
            && (tick - self.offset_ticks) % self.every_ticks < self.length_ticks
    }
}

pub struct ToneSource {
    config: AnalysisConfig,
    frequency_hz: f32,
    amplitude: f32,
    burst: Option<BurstPattern>,
    max_ticks: Option<u64>,
    tick: u64,
    sample_index: u64,
    noise: StdRng,
    hop: Vec<f32>,
    window: Option<PcmWindow>,
}

impl ToneSource {
    /// Create a steady sine source
    ///
    /// # Arguments
    /// * `config` - Sample rate, FFT size and tick rate
    /// * `frequency_hz` - Tone frequency; must lie below Nyquist
    /// * `amplitude` - Peak amplitude (0.0-1.0)
    pub fn new(config: &AnalysisConfig, frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            config: config.clone(),
            frequency_hz,
            amplitude,
            burst: None,
            max_ticks: None,
            tick: 0,
            sample_index: 0,
            noise: StdRng::seed_from_u64(BURST_NOISE_SEED),
            hop: Vec::with_capacity(config.hop_size()),
            window: None,
        }
    }

    /// Add periodic noise bursts
    pub fn with_bursts(mut self, burst: BurstPattern) -> Self {
        self.burst = Some(burst);
        self
    }

    /// Stop after a fixed number of ticks
    pub fn with_limit(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn ticks_produced(&self) -> u64 {
        self.tick
    }

    /// Whether the given tick carries a burst
    pub fn is_burst_tick(&self, tick: u64) -> bool {
        self.burst.map_or(false, |burst| burst.is_active(tick))
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        let nyquist = self.config.sample_rate as f32 / 2.0;
        if self.config.sample_rate == 0 {
            return Err(AnalysisError::SourceUnavailable {
                reason: "sample rate is zero".to_string(),
            });
        }
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 || self.frequency_hz >= nyquist
        {
            return Err(AnalysisError::SourceUnavailable {
                reason: format!(
                    "tone frequency {} Hz outside 0..{} Hz",
                    self.frequency_hz, nyquist
                ),
            });
        }
        if !self.amplitude.is_finite() {
            return Err(AnalysisError::SourceUnavailable {
                reason: "tone amplitude is not finite".to_string(),
            });
        }
        Ok(())
    }

    fn fill_hop(&mut self) {
        let sample_rate = self.config.sample_rate as f64;
        let burst_active = self.is_burst_tick(self.tick);
        let burst_amplitude = self.burst.map_or(0.0, |burst| burst.amplitude);
        let step = 2.0 * std::f64::consts::PI * self.frequency_hz as f64 / sample_rate;

        self.hop.clear();
        for _ in 0..self.config.hop_size() {
            let mut sample = self.amplitude * (step * self.sample_index as f64).sin() as f32;
            if burst_active {
                sample += burst_amplitude * self.noise.gen_range(-1.0f32..1.0);
            }
            self.hop.push(sample.clamp(-1.0, 1.0));
            self.sample_index += 1;
        }
    }
}

impl SignalSource for ToneSource {
    fn initialize(&mut self) -> bool {
        if let Err(err) = self.validate() {
            log_analysis_error(&err, "ToneSource::initialize");
            return false;
        }

        self.tick = 0;
        self.sample_index = 0;
        self.noise = StdRng::seed_from_u64(BURST_NOISE_SEED);
        self.window = Some(PcmWindow::new(&self.config));
        log::debug!(
            "[ToneSource] Initialized: {} Hz at amplitude {}, bursts={:?}",
            self.frequency_hz,
            self.amplitude,
            self.burst
        );
        true
    }

    fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn read_frame(&mut self, frequency: &mut [u8], time_domain: &mut [u8]) -> bool {
        if self.window.is_none() {
            return false;
        }
        if self.max_ticks.is_some_and(|limit| self.tick >= limit) {
            return false;
        }

        self.fill_hop();
        let Some(window) = self.window.as_mut() else {
            return false;
        };
        let frame = window.advance(&self.hop);
        copy_frame(&frame, frequency, time_domain);

        self.tick += 1;
        true
    }
}
