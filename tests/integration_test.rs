//! Integration tests for the analysis → composition → playback pipeline
//!
//! These tests drive the public API end to end:
//! - Synthetic and WAV-backed signal sources feeding AppContext ticks
//! - Live features steering a concurrent composition
//! - Composition output routed through a recording playback sink
//! - Config documents and error codes at the parsing boundary

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use resonance_core::analysis::AudioFeatures;
use resonance_core::capture::{BurstPattern, ToneSource, WavFileSource};
use resonance_core::config::AppConfig;
use resonance_core::context::AppContext;
use resonance_core::engine::{CancelToken, CompositionEngine};
use resonance_core::error::{ErrorCode, GenerationError, GenerationErrorCodes};
use resonance_core::music::{
    midi_to_note_name, note_name_to_midi, GenerationConfig, GeneratorKind, ScaleType, Style,
};
use resonance_core::playback::{EventRecorder, InstrumentKind};

fn small_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.analysis.sample_rate = 48_000;
    config.analysis.fft_size = 1024;
    config
}

fn write_click_track(path: &Path, sample_rate: u32, seconds: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    let total = (sample_rate as f32 * seconds) as usize;
    let click_every = sample_rate as usize / 2;
    for i in 0..total {
        let t = i as f32 / sample_rate as f32;
        let mut value = 0.2 * (2.0 * std::f32::consts::PI * 110.0 * t).sin();
        if i % click_every < 400 {
            // Alternating full-scale square burst
            value += if i % 2 == 0 { 0.7 } else { -0.7 };
        }
        writer
            .write_sample((value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

#[test]
fn test_tone_bursts_trigger_beats() {
    let ctx = AppContext::new(small_config());
    let tone = ToneSource::new(&ctx.config().analysis, 220.0, 0.3)
        .with_bursts(BurstPattern {
            offset_ticks: 30,
            every_ticks: 30,
            length_ticks: 1,
            amplitude: 0.8,
        })
        .with_limit(120);
    assert!(ctx.attach_source(Box::new(tone)));

    let mut ticks = Vec::new();
    while let Some(features) = ctx.tick() {
        ticks.push(features);
    }
    assert_eq!(ticks.len(), 120);

    for features in &ticks {
        for band in [features.bass_energy, features.mid_energy, features.high_energy] {
            assert!((0.0..=1.0).contains(&band));
        }
    }
    assert!(ticks[30].beat_detected, "first burst should register as a beat");
    assert!(ticks.iter().filter(|f| f.beat_detected).count() >= 3);
}

#[test]
fn test_wav_source_drives_context() {
    let path = std::env::temp_dir().join(format!("resonance_click_{}.wav", std::process::id()));
    write_click_track(&path, 48_000, 1.0);

    let config = small_config();
    let ctx = AppContext::new(config.clone());
    assert!(ctx.attach_source(Box::new(WavFileSource::new(&path, &config.analysis))));

    let mut count = 0;
    while ctx.tick().is_some() {
        count += 1;
    }
    // 48000 samples / 800-sample hop
    assert_eq!(count, 60);
    assert!(ctx.latest_features().is_some());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_live_features_steer_composition_and_playback() {
    let ctx = AppContext::new(small_config());
    let tone = ToneSource::new(&ctx.config().analysis, 440.0, 0.6).with_limit(30);
    assert!(ctx.attach_source(Box::new(tone)));
    while ctx.tick().is_some() {}

    let request = GenerationConfig {
        style: Style::Ambient,
        scale_type: ScaleType::Dorian,
        steps: 32,
        ..GenerationConfig::default()
    };
    let composition = ctx
        .compose_with_live_audio(&request, &CancelToken::new())
        .await
        .expect("composition");

    let harmony = composition.harmony.as_ref().expect("harmony slot");
    assert_eq!(harmony.notes.len(), 16);
    assert_eq!(harmony.tempo, Style::Ambient.tempo());

    let mut recorder = EventRecorder::new();
    assert_eq!(composition.schedule_all(&mut recorder), 4);
    assert_eq!(recorder.events().len(), composition.note_count());
    assert!(recorder
        .events_for(InstrumentKind::Percussion)
        .all(|event| event.duration_seconds > 0.0));
}

#[tokio::test]
async fn test_engine_is_reproducible_across_instances() {
    let config = GenerationConfig {
        style: Style::Experimental,
        scale_type: ScaleType::Blues,
        audio_analysis: Some(AudioFeatures {
            bass_energy: 0.8,
            mid_energy: 0.4,
            high_energy: 0.2,
            ..AudioFeatures::default()
        }),
        ..GenerationConfig::default()
    };

    let a = CompositionEngine::new()
        .generate_composition(&config, 1234, &CancelToken::new())
        .await
        .unwrap();
    let b = CompositionEngine::new()
        .generate_composition(&config, 1234, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(a, b);

    for kind in GeneratorKind::ALL {
        let phrase = a.phrase(kind).expect("all generators loaded");
        for note in &phrase.notes {
            assert!(note.duration > 0.0);
            assert!(note.end_time > note.start_time);
        }
    }
}

#[test]
fn test_config_document_errors_carry_codes() {
    let err = GenerationConfig::from_json(r#"{ "scaleType": "lydian" }"#).unwrap_err();
    assert_eq!(err.code(), GenerationErrorCodes::INVALID_CONFIG);

    let err: GenerationError = "H#".parse::<resonance_core::music::PitchClass>().unwrap_err();
    assert_eq!(err.code(), GenerationErrorCodes::UNKNOWN_KEY);
}

#[test]
fn test_note_names_round_trip() {
    for pitch in 0..=127u8 {
        assert_eq!(note_name_to_midi(&midi_to_note_name(pitch)), Some(pitch));
    }
}
