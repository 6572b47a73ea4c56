// WavFileSource - replays a WAV file one analysis tick at a time
//
// The whole file is decoded to mono f32 on initialize(). Every read_frame()
// advances by one hop (sample_rate / tick_rate samples) and returns the
// byte frame of the trailing FFT window.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};

use super::{copy_frame, PcmWindow, SignalSource};
use crate::analysis::ByteFrame;
use crate::config::AnalysisConfig;
use crate::error::{log_analysis_error, AnalysisError};

/// Decode a WAV file into mono samples in -1.0..=1.0
///
/// # Returns
/// `(samples, sample_rate)`; multi-channel files are averaged to mono
pub fn decode_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32), AnalysisError> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AnalysisError::DecodeFailed {
                    reason: format!("unsupported bit depth {}", spec.bits_per_sample),
                });
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 * scale))
                .collect::<Result<Vec<f32>, hound::Error>>()?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok((mono, spec.sample_rate))
}

pub struct WavFileSource {
    path: PathBuf,
    config: AnalysisConfig,
    samples: Vec<f32>,
    position: usize,
    window: Option<PcmWindow>,
}

impl WavFileSource {
    /// Create an uninitialized source
    ///
    /// The file is not touched until `initialize()`.
    pub fn new<P: Into<PathBuf>>(path: P, config: &AnalysisConfig) -> Self {
        Self {
            path: path.into(),
            config: config.clone(),
            samples: Vec::new(),
            position: 0,
            window: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Analysis config adjusted to the file's sample rate
    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Number of ticks the file yields in total
    pub fn total_ticks(&self) -> usize {
        self.samples.len().div_ceil(self.config.hop_size())
    }

    /// Advance one hop and compute the frame for the new window
    pub fn next_frame(&mut self) -> Result<ByteFrame, AnalysisError> {
        let hop = self.config.hop_size();
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| AnalysisError::SourceUnavailable {
                reason: format!("{} was not initialized", self.path.display()),
            })?;
        if self.position >= self.samples.len() {
            return Err(AnalysisError::SourceExhausted);
        }

        let end = (self.position + hop).min(self.samples.len());
        let frame = window.advance(&self.samples[self.position..end]);
        self.position = end;
        Ok(frame)
    }

    fn load(&mut self) -> Result<(), AnalysisError> {
        let (samples, sample_rate) = decode_wav(&self.path)?;
        if samples.is_empty() {
            return Err(AnalysisError::SourceUnavailable {
                reason: format!("{} contains no samples", self.path.display()),
            });
        }

        if sample_rate != self.config.sample_rate {
            log::info!(
                "[WavFileSource] Using file sample rate {} Hz instead of {} Hz",
                sample_rate,
                self.config.sample_rate
            );
            self.config.sample_rate = sample_rate;
        }

        log::info!(
            "[WavFileSource] Loaded {}: {} samples at {} Hz",
            self.path.display(),
            samples.len(),
            sample_rate
        );

        self.samples = samples;
        self.position = 0;
        self.window = Some(PcmWindow::new(&self.config));
        Ok(())
    }
}

impl SignalSource for WavFileSource {
    fn initialize(&mut self) -> bool {
        match self.load() {
            Ok(()) => true,
            Err(err) => {
                log_analysis_error(&err, "WavFileSource::initialize");
                false
            }
        }
    }

    fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// The decoded file's rate, or the configured rate before initialization
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn read_frame(&mut self, frequency: &mut [u8], time_domain: &mut [u8]) -> bool {
        match self.next_frame() {
            Ok(frame) => {
                copy_frame(&frame, frequency, time_domain);
                true
            }
            Err(AnalysisError::SourceExhausted) => false,
            Err(err) => {
                log_analysis_error(&err, "WavFileSource::read_frame");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_sine(path: &Path, sample_rate: u32, channels: u16, seconds: f32) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        let total = (sample_rate as f32 * seconds) as usize;
        for i in 0..total {
            let t = i as f32 / sample_rate as f32;
            let value = (0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("resonance_{}_{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_decode_stereo_to_mono() {
        let path = temp_wav("stereo");
        write_sine(&path, 8_000, 2, 0.1);

        let (samples, rate) = decode_wav(&path).unwrap();
        assert_eq!(rate, 8_000);
        assert_eq!(samples.len(), 800);
        assert!(samples.iter().all(|s| s.abs() <= 0.51));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_fails_initialize() {
        let mut source = WavFileSource::new("/nonexistent/input.wav", &AnalysisConfig::default());
        assert!(!source.initialize());

        let mut frequency = [0u8; 1024];
        let mut time_domain = [0u8; 1024];
        assert!(!source.read_frame(&mut frequency, &mut time_domain));
    }

    #[test]
    fn test_yields_one_frame_per_hop_until_exhausted() {
        let path = temp_wav("ticks");
        write_sine(&path, 48_000, 1, 0.5);

        let config = AnalysisConfig {
            sample_rate: 44_100,
            fft_size: 1024,
            ..AnalysisConfig::default()
        };
        let mut source = WavFileSource::new(&path, &config);
        assert!(source.initialize());
        assert_eq!(source.sample_rate(), 48_000);
        assert_eq!(source.bin_count(), 512);

        // 24000 samples / 800-sample hop
        assert_eq!(source.total_ticks(), 30);

        let mut frequency = vec![0u8; source.bin_count()];
        let mut time_domain = vec![0u8; source.bin_count()];
        let mut ticks = 0;
        while source.read_frame(&mut frequency, &mut time_domain) {
            ticks += 1;
        }
        assert_eq!(ticks, 30);
        assert!(frequency.iter().any(|&b| b > 200));
        assert_eq!(source.next_frame(), Err(AnalysisError::SourceExhausted));

        let _ = std::fs::remove_file(&path);
    }
}
