//! CompositionEngine: concurrent fan-out over the four phrase generators.
//!
//! Every generator is a pure function of `(GenerationConfig, StdRng)`. The
//! engine derives one RNG per generator from the request seed and a fixed
//! per-generator salt, so results are identical whether the generators run
//! on blocking worker threads (`generate_composition`) or one after another
//! (`compose_blocking`).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::config::GenerationSettings;
use crate::engine::cancel::CancelToken;
use crate::error::{log_generation_error, GenerationError};
use crate::music::{
    GenerationConfig, GeneratorKind, HarmonyGenerator, MelodyGenerator, MusicalPhrase,
    PhraseGenerator, RhythmGenerator, TextureGenerator,
};

/// Result of one composition request.
///
/// A slot is `None` when its generator was unloaded or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub melody: Option<MusicalPhrase>,
    pub harmony: Option<MusicalPhrase>,
    pub rhythm: Option<MusicalPhrase>,
    pub texture: Option<MusicalPhrase>,
}

impl Composition {
    pub fn phrase(&self, kind: GeneratorKind) -> Option<&MusicalPhrase> {
        match kind {
            GeneratorKind::Melody => self.melody.as_ref(),
            GeneratorKind::Harmony => self.harmony.as_ref(),
            GeneratorKind::Rhythm => self.rhythm.as_ref(),
            GeneratorKind::Texture => self.texture.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: GeneratorKind) -> &mut Option<MusicalPhrase> {
        match kind {
            GeneratorKind::Melody => &mut self.melody,
            GeneratorKind::Harmony => &mut self.harmony,
            GeneratorKind::Rhythm => &mut self.rhythm,
            GeneratorKind::Texture => &mut self.texture,
        }
    }

    /// Present phrases in melody, harmony, rhythm, texture order
    pub fn phrases(&self) -> impl Iterator<Item = (GeneratorKind, &MusicalPhrase)> {
        GeneratorKind::ALL
            .into_iter()
            .filter_map(move |kind| self.phrase(kind).map(|phrase| (kind, phrase)))
    }

    pub fn note_count(&self) -> usize {
        self.phrases().map(|(_, phrase)| phrase.notes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases().next().is_none()
    }
}

type GeneratorRegistry = HashMap<GeneratorKind, Arc<dyn PhraseGenerator>>;

/// Owns the phrase generators and runs composition requests.
pub struct CompositionEngine {
    generators: RwLock<GeneratorRegistry>,
    timeout: Option<Duration>,
}

impl CompositionEngine {
    /// Create an engine with all four default generators loaded and no timeout.
    pub fn new() -> Self {
        let generators = GeneratorKind::ALL
            .into_iter()
            .map(|kind| (kind, default_generator(kind)))
            .collect();

        Self {
            generators: RwLock::new(generators),
            timeout: None,
        }
    }

    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self::new().with_timeout(settings.timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    // ========================================================================
    // GENERATOR AVAILABILITY
    // ========================================================================

    /// Install a generator, replacing whatever was loaded for its kind.
    pub fn load(&self, generator: Arc<dyn PhraseGenerator>) {
        let kind = generator.kind();
        match self.generators.write() {
            Ok(mut registry) => {
                registry.insert(kind, generator);
                log::info!("[CompositionEngine] Loaded {} generator", kind);
            }
            Err(_) => log::error!(
                "[CompositionEngine] Generator registry lock poisoned, cannot load {}",
                kind
            ),
        }
    }

    pub fn load_default(&self, kind: GeneratorKind) {
        self.load(default_generator(kind));
    }

    /// Remove a generator; its slot is `None` in later compositions.
    ///
    /// # Returns
    /// `true` if a generator was loaded for `kind`
    pub fn unload(&self, kind: GeneratorKind) -> bool {
        match self.generators.write() {
            Ok(mut registry) => {
                let removed = registry.remove(&kind).is_some();
                if removed {
                    log::info!("[CompositionEngine] Unloaded {} generator", kind);
                }
                removed
            }
            Err(_) => false,
        }
    }

    pub fn is_loaded(&self, kind: GeneratorKind) -> bool {
        self.generators
            .read()
            .map(|registry| registry.contains_key(&kind))
            .unwrap_or(false)
    }

    fn generator(&self, kind: GeneratorKind) -> Option<Arc<dyn PhraseGenerator>> {
        let generator = self
            .generators
            .read()
            .ok()
            .and_then(|registry| registry.get(&kind).cloned());

        if generator.is_none() {
            tracing::warn!(
                "[CompositionEngine] {} generator not loaded, slot will be empty",
                kind
            );
        }
        generator
    }

    // ========================================================================
    // COMPOSITION
    // ========================================================================

    /// Run all loaded generators concurrently and join their phrases.
    ///
    /// # Arguments
    /// * `config` - Generation parameters; out-of-range values are clamped
    /// * `seed` - Base seed; each generator derives its own RNG from it
    /// * `cancel` - Token that aborts the pending join
    ///
    /// # Returns
    /// The joined composition, `GenerationError::Cancelled` if the token
    /// fires first, or `GenerationError::TimedOut` if the engine timeout
    /// elapses first. Generator tasks already running finish in the
    /// background after an abort; their output is discarded.
    pub async fn generate_composition(
        &self,
        config: &GenerationConfig,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Composition, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let config = Arc::new(config.clone().sanitized());
        let [melody, harmony, rhythm, texture] =
            GeneratorKind::ALL.map(|kind| self.spawn_generator(kind, &config, seed));

        let join = async {
            let (melody, harmony, rhythm, texture) = tokio::join!(
                settle(GeneratorKind::Melody, melody),
                settle(GeneratorKind::Harmony, harmony),
                settle(GeneratorKind::Rhythm, rhythm),
                settle(GeneratorKind::Texture, texture),
            );
            Composition {
                melody,
                harmony,
                rhythm,
                texture,
            }
        };

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, join).await.map_err(|_| {
                    GenerationError::TimedOut {
                        timeout_ms: limit.as_millis() as u64,
                    }
                }),
                None => Ok(join.await),
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            outcome = bounded => outcome,
        };

        match &result {
            Ok(composition) => tracing::debug!(
                "[CompositionEngine] Composition ready: style={}, seed={}, notes={}",
                config.style,
                seed,
                composition.note_count()
            ),
            Err(err) => log_generation_error(err, "generate_composition"),
        }
        result
    }

    fn spawn_generator(
        &self,
        kind: GeneratorKind,
        config: &Arc<GenerationConfig>,
        seed: u64,
    ) -> Option<JoinHandle<MusicalPhrase>> {
        let generator = self.generator(kind)?;
        let config = Arc::clone(config);
        Some(tokio::task::spawn_blocking(move || {
            let mut rng = generator_rng(kind, seed);
            generator.generate(&config, &mut rng)
        }))
    }

    /// Run all loaded generators on the calling thread.
    ///
    /// Produces exactly what `generate_composition` produces for the same
    /// config and seed. A panicking generator propagates its panic.
    pub fn compose_blocking(&self, config: &GenerationConfig, seed: u64) -> Composition {
        let config = config.clone().sanitized();
        let mut composition = Composition::default();

        for kind in GeneratorKind::ALL {
            if let Some(generator) = self.generator(kind) {
                let mut rng = generator_rng(kind, seed);
                *composition.slot_mut(kind) = Some(generator.generate(&config, &mut rng));
            }
        }

        composition
    }
}

impl Default for CompositionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn default_generator(kind: GeneratorKind) -> Arc<dyn PhraseGenerator> {
    match kind {
        GeneratorKind::Melody => Arc::new(MelodyGenerator::new()),
        GeneratorKind::Harmony => Arc::new(HarmonyGenerator::new()),
        GeneratorKind::Rhythm => Arc::new(RhythmGenerator::new()),
        GeneratorKind::Texture => Arc::new(TextureGenerator::new()),
    }
}

/// RNG for one generator within a request
pub fn generator_rng(kind: GeneratorKind, seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ kind.seed_salt())
}

async fn settle(
    kind: GeneratorKind,
    handle: Option<JoinHandle<MusicalPhrase>>,
) -> Option<MusicalPhrase> {
    match handle?.await {
        Ok(phrase) => Some(phrase),
        Err(err) => {
            tracing::warn!(
                "[CompositionEngine] {} generator task failed: {}",
                kind,
                err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests;
