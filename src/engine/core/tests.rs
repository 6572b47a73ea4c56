use super::*;
use crate::music::Style;

struct PanickingGenerator;

impl PhraseGenerator for PanickingGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Texture
    }

    fn generate(&self, _config: &GenerationConfig, _rng: &mut StdRng) -> MusicalPhrase {
        panic!("texture model crashed");
    }
}

struct SlowGenerator(Duration);

impl PhraseGenerator for SlowGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Melody
    }

    fn generate(&self, config: &GenerationConfig, _rng: &mut StdRng) -> MusicalPhrase {
        std::thread::sleep(self.0);
        MusicalPhrase::for_config(config)
    }
}

#[tokio::test]
async fn test_all_slots_filled_by_default() {
    let engine = CompositionEngine::new();
    let composition = engine
        .generate_composition(&GenerationConfig::default(), 42, &CancelToken::new())
        .await
        .unwrap();

    for kind in GeneratorKind::ALL {
        assert!(composition.phrase(kind).is_some(), "{} missing", kind);
    }
    assert!(composition.note_count() > 0);
}

#[tokio::test]
async fn test_concurrent_and_blocking_paths_agree() {
    let engine = CompositionEngine::new();
    let config = GenerationConfig {
        style: Style::Jazz,
        steps: 48,
        ..GenerationConfig::default()
    };

    let concurrent = engine
        .generate_composition(&config, 7, &CancelToken::new())
        .await
        .unwrap();
    let sequential = engine.compose_blocking(&config, 7);
    assert_eq!(concurrent, sequential);
}

#[test]
fn test_different_seeds_differ() {
    let engine = CompositionEngine::new();
    let config = GenerationConfig::default();
    let a = engine.compose_blocking(&config, 1);
    let b = engine.compose_blocking(&config, 2);
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_unloaded_generator_leaves_empty_slot() {
    let engine = CompositionEngine::new();
    assert!(engine.unload(GeneratorKind::Harmony));
    assert!(!engine.is_loaded(GeneratorKind::Harmony));
    assert!(!engine.unload(GeneratorKind::Harmony));

    let composition = engine
        .generate_composition(&GenerationConfig::default(), 3, &CancelToken::new())
        .await
        .unwrap();
    assert!(composition.harmony.is_none());
    assert!(composition.melody.is_some());
    assert!(composition.rhythm.is_some());
    assert!(composition.texture.is_some());

    engine.load_default(GeneratorKind::Harmony);
    assert!(engine.is_loaded(GeneratorKind::Harmony));
}

#[tokio::test]
async fn test_panicking_generator_degrades_to_none() {
    let engine = CompositionEngine::new();
    engine.load(Arc::new(PanickingGenerator));

    let composition = engine
        .generate_composition(&GenerationConfig::default(), 3, &CancelToken::new())
        .await
        .unwrap();
    assert!(composition.texture.is_none());
    assert!(composition.melody.is_some());
}

#[tokio::test]
async fn test_cancelled_token_aborts() {
    let engine = CompositionEngine::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = engine
        .generate_composition(&GenerationConfig::default(), 3, &cancel)
        .await;
    assert_eq!(result, Err(GenerationError::Cancelled));
}

#[tokio::test]
async fn test_cancel_during_join() {
    let engine = CompositionEngine::new();
    engine.load(Arc::new(SlowGenerator(Duration::from_millis(300))));
    let cancel = CancelToken::new();

    let trigger = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let result = engine
        .generate_composition(&GenerationConfig::default(), 3, &cancel)
        .await;
    trigger.await.unwrap();
    assert_eq!(result, Err(GenerationError::Cancelled));
}

#[tokio::test]
async fn test_timeout_elapses() {
    let engine = CompositionEngine::new().with_timeout(Some(Duration::from_millis(20)));
    engine.load(Arc::new(SlowGenerator(Duration::from_millis(300))));

    let result = engine
        .generate_composition(&GenerationConfig::default(), 3, &CancelToken::new())
        .await;
    assert_eq!(result, Err(GenerationError::TimedOut { timeout_ms: 20 }));
}

#[test]
fn test_composition_serializes_empty_slots_as_null() {
    let composition = Composition::default();
    let json = serde_json::to_value(&composition).unwrap();
    assert!(json["melody"].is_null());
    assert!(composition.is_empty());
}
