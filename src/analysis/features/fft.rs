// FFT module - Byte spectrum front-end
//
// Converts mono PCM windows into the two unsigned byte arrays the spectral
// analyzer consumes: a decibel-scaled magnitude array and a time-domain
// array centered on 128. The decibel mapping follows browser analyser
// nodes, so frames captured there and frames computed here are comparable.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::config::AnalysisConfig;

/// One analysis frame in byte form
#[derive(Debug, Clone, PartialEq)]
pub struct ByteFrame {
    /// Frequency magnitudes, 0-255 per bin
    pub frequency: Vec<u8>,
    /// Time-domain samples, 0-255 centered on 128
    pub time_domain: Vec<u8>,
}

/// FFT processor that turns PCM windows into byte frames
pub struct ByteSpectrum {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    min_decibels: f32,
    max_decibels: f32,
    /// Hann window for FFT (pre-computed)
    window: Vec<f32>,
}

impl ByteSpectrum {
    /// Create a new byte spectrum processor
    ///
    /// # Arguments
    /// * `config` - FFT size and decibel range
    pub fn new(config: &AnalysisConfig) -> Self {
        let fft_size = config.fft_size.max(2);

        // Pre-compute Hann window to reduce spectral leakage
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (fft_size as f32 - 1.0)).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let (min_decibels, max_decibels) = if config.max_decibels > config.min_decibels {
            (config.min_decibels, config.max_decibels)
        } else {
            log::warn!(
                "[ByteSpectrum] Invalid decibel range {}..{}, using -100..-30",
                config.min_decibels,
                config.max_decibels
            );
            (-100.0, -30.0)
        };

        Self {
            fft,
            fft_size,
            min_decibels,
            max_decibels,
            window,
        }
    }

    /// Number of bins per frame (half the FFT size)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Compute a byte frame from a PCM window
    ///
    /// Shorter windows are zero-padded, longer ones truncated to the FFT size.
    /// The time-domain array holds the most recent `bin_count` samples.
    pub fn compute_frame(&self, audio: &[f32]) -> ByteFrame {
        let audio = &audio[..audio.len().min(self.fft_size)];

        let mut buffer: Vec<Complex<f32>> = audio
            .iter()
            .zip(self.window.iter())
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        let bins = self.bin_count();
        let range = self.max_decibels - self.min_decibels;
        let frequency = buffer[..bins]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / self.fft_size as f32;
                let db = if magnitude > 0.0 {
                    20.0 * magnitude.log10()
                } else {
                    f32::NEG_INFINITY
                };
                let scaled = 255.0 * (db - self.min_decibels) / range;
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect();

        let mut time_domain = vec![128u8; bins];
        let tail_start = audio.len().saturating_sub(bins);
        let tail = &audio[tail_start..];
        let offset = bins - tail.len();
        for (slot, &sample) in time_domain[offset..].iter_mut().zip(tail) {
            *slot = (128.0 + sample * 128.0).clamp(0.0, 255.0) as u8;
        }

        ByteFrame {
            frequency,
            time_domain,
        }
    }
}
