// Analysis module - per-tick audio feature extraction
//
// The AudioAnalyzer is the explicit, caller-owned replacement for a
// process-wide audio processor. It owns one SpectralAnalyzer and one
// BeatDetector and publishes every snapshot three ways:
// - pull: `latest()` returns the most recent snapshot
// - push (sync): registered observer callbacks run once per tick
// - push (async): a tokio broadcast channel, also exposed as a Stream
//
// Snapshots are Copy values; nothing is shared mutably across the boundary.

pub mod beat;
pub mod features;

pub use beat::{BeatDetector, BeatState};
pub use features::{AudioFeatures, ByteFrame, ByteSpectrum, SpectralAnalyzer, SpectralSnapshot};

use std::sync::{Arc, RwLock};

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::config::{AnalysisConfig, BeatDetectionConfig};
use crate::error::{log_analysis_error, AnalysisError};

/// Buffer size of the feature broadcast channel (about two seconds at 60 Hz)
const FEATURE_CHANNEL_CAPACITY: usize = 128;

/// Synchronous per-tick observer
pub type FeatureObserver = Box<dyn Fn(&AudioFeatures) + Send + Sync>;

/// AudioAnalyzer turns byte frames into AudioFeatures once per tick
pub struct AudioAnalyzer {
    spectral: SpectralAnalyzer,
    beat_detector: BeatDetector,
    latest: Arc<RwLock<Option<AudioFeatures>>>,
    feature_tx: broadcast::Sender<AudioFeatures>,
    observers: Vec<FeatureObserver>,
    ticks: u64,
}

impl AudioAnalyzer {
    /// Create an analyzer with default configuration at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self::with_config(
            &AnalysisConfig {
                sample_rate,
                ..AnalysisConfig::default()
            },
            BeatDetectionConfig::default(),
        )
    }

    /// Create an analyzer with explicit configuration
    pub fn with_config(analysis: &AnalysisConfig, beat: BeatDetectionConfig) -> Self {
        let (feature_tx, _) = broadcast::channel(FEATURE_CHANNEL_CAPACITY);
        Self {
            spectral: SpectralAnalyzer::new(analysis.sample_rate),
            beat_detector: BeatDetector::with_config(beat),
            latest: Arc::new(RwLock::new(None)),
            feature_tx,
            observers: Vec::new(),
            ticks: 0,
        }
    }

    /// Process one tick's frame
    ///
    /// # Arguments
    /// * `frequency` - Magnitude bins, 0-255
    /// * `time_domain` - Time-domain samples, 0-255 centered on 128
    ///
    /// # Returns
    /// The new snapshot, which has also been published to every consumer
    pub fn process_frame(&mut self, frequency: &[u8], time_domain: &[u8]) -> AudioFeatures {
        if frequency.len() != time_domain.len() {
            tracing::debug!(
                "[AudioAnalyzer] Frame length mismatch: {} bins vs {} samples",
                frequency.len(),
                time_domain.len()
            );
        }

        let snapshot = self.spectral.analyze(frequency, time_domain);
        let beat = self.beat_detector.observe(snapshot.combined_energy());
        let features = snapshot.with_beat(beat.detected, beat.strength);

        self.ticks += 1;
        if beat.detected {
            tracing::trace!(
                "[AudioAnalyzer] Beat at tick {}: strength={:.3}, threshold={:.3}",
                self.ticks,
                beat.strength,
                beat.threshold
            );
        }

        self.publish(features);
        features
    }

    /// Process a byte frame produced by a ByteSpectrum
    pub fn process(&mut self, frame: &ByteFrame) -> AudioFeatures {
        self.process_frame(&frame.frequency, &frame.time_domain)
    }

    fn publish(&self, features: AudioFeatures) {
        match self.latest.write() {
            Ok(mut guard) => *guard = Some(features),
            Err(_) => log_analysis_error(
                &AnalysisError::LockPoisoned {
                    component: "latest_features".to_string(),
                },
                "publish",
            ),
        }

        for observer in &self.observers {
            observer(&features);
        }

        // No receivers is the normal idle case
        let _ = self.feature_tx.send(features);
    }

    /// Most recent snapshot, if any tick has been processed
    pub fn latest(&self) -> Option<AudioFeatures> {
        self.latest.read().ok().and_then(|guard| *guard)
    }

    /// Shared handle to the latest snapshot for readers on other threads
    pub fn latest_handle(&self) -> Arc<RwLock<Option<AudioFeatures>>> {
        Arc::clone(&self.latest)
    }

    /// Register a synchronous observer invoked once per tick
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&AudioFeatures) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Subscribe to the feature broadcast channel
    ///
    /// Slow subscribers lag and lose the oldest snapshots rather than
    /// blocking the analysis tick.
    pub fn subscribe(&self) -> broadcast::Receiver<AudioFeatures> {
        self.feature_tx.subscribe()
    }

    /// Stream of snapshots; lagged gaps are skipped silently
    pub fn feature_stream(&self) -> impl Stream<Item = AudioFeatures> + Send + 'static {
        BroadcastStream::new(self.feature_tx.subscribe())
            .filter_map(|item| async move { item.ok() })
    }

    /// Sample rate used to map bins to Hz
    pub fn sample_rate(&self) -> u32 {
        self.spectral.sample_rate()
    }

    /// Retune bin-to-Hz mapping for a source running at a different rate
    ///
    /// Observers, subscribers and the latest-snapshot handle are kept. Beat
    /// history is cleared since energies from the old rate are not comparable.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if sample_rate == self.spectral.sample_rate() {
            return;
        }
        self.spectral = SpectralAnalyzer::new(sample_rate);
        self.beat_detector.reset();
    }

    /// Number of ticks processed since creation or the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Clear beat history and the latest snapshot
    pub fn reset(&mut self) {
        self.beat_detector.reset();
        self.ticks = 0;
        if let Ok(mut guard) = self.latest.write() {
            *guard = None;
        }
    }
}
