// AppContext: Dependency Injection Container
// Owns the analyzer, the attached signal source and the composition engine
// so callers never reach for process-wide state

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::sync::broadcast;

use crate::analysis::{AudioAnalyzer, AudioFeatures};
use crate::capture::SignalSource;
use crate::config::AppConfig;
use crate::engine::{CancelToken, Composition, CompositionEngine};
use crate::error::{log_analysis_error, AnalysisError, GenerationError};
use crate::music::GenerationConfig;

/// A signal source plus the frame buffers it fills each tick
struct AttachedSource {
    source: Box<dyn SignalSource>,
    frequency: Vec<u8>,
    time_domain: Vec<u8>,
}

/// AppContext: Dependency injection container for all application state
///
/// Holds:
/// - The loaded AppConfig
/// - One AudioAnalyzer (the per-tick feature pipeline)
/// - An optional SignalSource driving `tick()`
/// - A shared CompositionEngine
///
/// Lock failures are surfaced as typed errors, never panics.
pub struct AppContext {
    config: AppConfig,
    analyzer: Arc<Mutex<AudioAnalyzer>>,
    latest: Arc<RwLock<Option<AudioFeatures>>>,
    source: Mutex<Option<AttachedSource>>,
    engine: Arc<CompositionEngine>,
}

impl AppContext {
    /// Create a context from an explicit configuration
    pub fn new(config: AppConfig) -> Self {
        let analyzer = AudioAnalyzer::with_config(&config.analysis, config.beat_detection.clone());
        let latest = analyzer.latest_handle();
        let engine = CompositionEngine::from_settings(&config.generation);

        Self {
            config,
            analyzer: Arc::new(Mutex::new(analyzer)),
            latest,
            source: Mutex::new(None),
            engine: Arc::new(engine),
        }
    }

    /// Create a context from the default config file location
    pub fn load() -> Self {
        Self::new(AppConfig::load())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<CompositionEngine> {
        Arc::clone(&self.engine)
    }

    // ========================================================================
    // LOCK HELPER METHODS
    // ========================================================================

    fn lock_analyzer(&self) -> Result<MutexGuard<'_, AudioAnalyzer>, AnalysisError> {
        self.analyzer.lock().map_err(|_| AnalysisError::LockPoisoned {
            component: "analyzer".to_string(),
        })
    }

    fn lock_source(&self) -> Result<MutexGuard<'_, Option<AttachedSource>>, AnalysisError> {
        self.source.lock().map_err(|_| AnalysisError::LockPoisoned {
            component: "signal_source".to_string(),
        })
    }

    // ========================================================================
    // ANALYSIS
    // ========================================================================

    /// Initialize and attach a signal source, replacing any previous one
    ///
    /// # Returns
    /// `false` if the source failed to initialize; the previous source (if
    /// any) stays attached
    pub fn attach_source(&self, mut source: Box<dyn SignalSource>) -> bool {
        if !source.initialize() {
            log::warn!("[AppContext] Signal source failed to initialize");
            return false;
        }

        let sample_rate = source.sample_rate();
        match self.lock_analyzer() {
            Ok(mut analyzer) => {
                if analyzer.sample_rate() != sample_rate {
                    log::info!(
                        "[AppContext] Retuning analyzer from {} Hz to source rate {} Hz",
                        analyzer.sample_rate(),
                        sample_rate
                    );
                    analyzer.set_sample_rate(sample_rate);
                }
            }
            Err(err) => {
                log_analysis_error(&err, "attach_source");
                return false;
            }
        }

        let bins = source.bin_count();
        let attached = AttachedSource {
            source,
            frequency: vec![0; bins],
            time_domain: vec![128; bins],
        };

        match self.lock_source() {
            Ok(mut guard) => {
                *guard = Some(attached);
                log::info!("[AppContext] Signal source attached ({} bins)", bins);
                true
            }
            Err(err) => {
                log_analysis_error(&err, "attach_source");
                false
            }
        }
    }

    /// Drop the attached source, if any
    pub fn detach_source(&self) -> bool {
        self.lock_source()
            .map(|mut guard| guard.take().is_some())
            .unwrap_or(false)
    }

    pub fn has_source(&self) -> bool {
        self.lock_source()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Pull one frame from the attached source and analyze it
    ///
    /// # Returns
    /// `None` when no source is attached or the source is exhausted
    pub fn tick(&self) -> Option<AudioFeatures> {
        let mut source_guard = match self.lock_source() {
            Ok(guard) => guard,
            Err(err) => {
                log_analysis_error(&err, "tick");
                return None;
            }
        };
        let attached = source_guard.as_mut()?;

        if !attached
            .source
            .read_frame(&mut attached.frequency, &mut attached.time_domain)
        {
            tracing::debug!("[AppContext] Signal source produced no frame");
            return None;
        }

        match self.process_frame(&attached.frequency, &attached.time_domain) {
            Ok(features) => Some(features),
            Err(err) => {
                log_analysis_error(&err, "tick");
                None
            }
        }
    }

    /// Analyze one externally captured frame
    pub fn process_frame(
        &self,
        frequency: &[u8],
        time_domain: &[u8],
    ) -> Result<AudioFeatures, AnalysisError> {
        let mut analyzer = self.lock_analyzer()?;
        Ok(analyzer.process_frame(frequency, time_domain))
    }

    /// Most recent snapshot, readable without touching the analyzer lock
    pub fn latest_features(&self) -> Option<AudioFeatures> {
        self.latest.read().ok().and_then(|guard| *guard)
    }

    pub fn subscribe_features(&self) -> Result<broadcast::Receiver<AudioFeatures>, AnalysisError> {
        Ok(self.lock_analyzer()?.subscribe())
    }

    /// Register a per-tick observer on the analyzer
    pub fn add_feature_observer<F>(&self, observer: F) -> Result<(), AnalysisError>
    where
        F: Fn(&AudioFeatures) + Send + Sync + 'static,
    {
        self.lock_analyzer()?.add_observer(observer);
        Ok(())
    }

    pub fn reset_analysis(&self) -> Result<(), AnalysisError> {
        self.lock_analyzer()?.reset();
        Ok(())
    }

    // ========================================================================
    // COMPOSITION
    // ========================================================================

    /// Compose with the configured default seed
    pub async fn compose(
        &self,
        config: &GenerationConfig,
        cancel: &CancelToken,
    ) -> Result<Composition, GenerationError> {
        self.compose_seeded(config, self.config.generation.seed, cancel)
            .await
    }

    pub async fn compose_seeded(
        &self,
        config: &GenerationConfig,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Composition, GenerationError> {
        self.engine.generate_composition(config, seed, cancel).await
    }

    /// Compose, filling `audio_analysis` from the latest snapshot when the
    /// caller left it empty
    pub async fn compose_with_live_audio(
        &self,
        config: &GenerationConfig,
        cancel: &CancelToken,
    ) -> Result<Composition, GenerationError> {
        let mut config = config.clone();
        if config.audio_analysis.is_none() {
            config.audio_analysis = self.latest_features();
            if config.audio_analysis.is_none() {
                log::debug!("[AppContext] No live features yet, composing without audio");
            }
        }
        self.compose(&config, cancel).await
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
