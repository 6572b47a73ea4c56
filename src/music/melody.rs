// MelodyGenerator - Markov-guided melodic line gated by a rhythm template
//
// Per step:
// 1. Rhythm intensity = style template[step % 8] * audio energy multiplier;
//    zero intensity is a rest (so fewer than `steps` notes may be emitted)
// 2. With probability `temperature` the next degree is drawn from the
//    Markov chain, otherwise the line moves one degree stepwise
// 3. With probability `harmonic_complexity` the degree is nudged ±1
// 4. pitch = 60 + key + scale interval + bass offset (-2..=+2)

use rand::rngs::StdRng;
use rand::Rng;

use super::markov::MarkovChain;
use super::types::{clamp_pitch, GenerationConfig, MusicalPhrase, Note};
use super::{GeneratorKind, PhraseGenerator};

/// MIDI middle C
const MIDDLE_C: i32 = 60;

/// Inclusive pitch range of melody notes
pub const MELODY_PITCH_RANGE: (u8, u8) = (48, 84);

/// Length of one melody step in beats
pub const STEP_BEATS: f64 = 0.5;

pub struct MelodyGenerator {
    chain: MarkovChain,
}

impl MelodyGenerator {
    pub fn new() -> Self {
        Self {
            chain: MarkovChain::trained(),
        }
    }

    pub fn chain(&self) -> &MarkovChain {
        &self.chain
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> MusicalPhrase {
        let mut phrase = MusicalPhrase::for_config(config);
        let influence = config.influence();
        let template = config.style.melody_rhythm();
        let intervals = config.scale_type.intervals();
        let scale_len = intervals.len() as i32;

        let energy_multiplier = if influence.present {
            0.5 + influence.energy * 0.5
        } else {
            1.0
        };
        let bass_offset = (((influence.bass - 0.5) * 4.0).floor() as i32).clamp(-2, 2);
        let root = MIDDLE_C + config.key_signature.value() as i32;

        let mut degree: i32 = 0;
        let mut direction: i32 = 1;

        for step in 0..config.steps {
            let intensity = template[step % template.len()] * energy_multiplier;
            if intensity <= 0.0 {
                continue;
            }

            let markov_draw = if rng.gen::<f32>() < config.temperature {
                self.chain.next(degree as u8, rng)
            } else {
                None
            };
            degree = match markov_draw {
                Some(next) => next as i32 % scale_len,
                None => {
                    if !(0..scale_len).contains(&(degree + direction)) {
                        direction = -direction;
                    }
                    (degree + direction).clamp(0, scale_len - 1)
                }
            };

            let mut voiced = degree;
            if rng.gen::<f32>() < config.harmonic_complexity {
                let nudge = if rng.gen_bool(0.5) { 1 } else { -1 };
                voiced = (voiced + nudge).rem_euclid(scale_len);
            }

            let pitch = clamp_pitch(
                root + intervals[voiced as usize] as i32 + bass_offset,
                MELODY_PITCH_RANGE.0,
                MELODY_PITCH_RANGE.1,
            );
            let velocity = (0.3 + intensity * 0.5 + influence.treble * 0.2).clamp(0.1, 1.0);
            let duration = STEP_BEATS * (0.5 + 0.5 * intensity.min(1.0) as f64);

            phrase
                .notes
                .push(Note::new(pitch, velocity, step as f64 * STEP_BEATS, duration));
        }

        phrase
    }
}

impl Default for MelodyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseGenerator for MelodyGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Melody
    }

    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> MusicalPhrase {
        self.generate_with(config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AudioFeatures;
    use crate::music::theory::{ScaleType, Style};
    use rand::SeedableRng;

    #[test]
    fn test_eight_steps_yield_at_most_eight_notes() {
        let generator = MelodyGenerator::new();
        for style in Style::ALL {
            let config = GenerationConfig {
                steps: 8,
                style,
                ..GenerationConfig::default()
            };
            let phrase = generator.generate_with(&config, &mut StdRng::seed_from_u64(3));
            assert!(phrase.notes.len() <= 8);

            let expected = style.melody_rhythm().iter().filter(|&&v| v > 0.0).count();
            assert_eq!(phrase.notes.len(), expected, "rests follow the template");
        }
    }

    #[test]
    fn test_generator_walks_the_trained_table() {
        let generator = MelodyGenerator::new();
        assert_eq!(generator.chain(), &MarkovChain::trained());
        assert_eq!(generator.chain().state_count(), 7);
    }

    #[test]
    fn test_pitches_stay_in_scale() {
        let generator = MelodyGenerator::new();
        for scale in ScaleType::ALL {
            let config = GenerationConfig {
                steps: 64,
                scale_type: scale,
                temperature: 1.0,
                harmonic_complexity: 0.8,
                ..GenerationConfig::default()
            };
            let phrase = generator.generate_with(&config, &mut StdRng::seed_from_u64(11));
            for note in &phrase.notes {
                let interval = (note.pitch as i32 - 60) as u8;
                assert!(
                    scale.intervals().contains(&interval),
                    "pitch {} not in {} scale",
                    note.pitch,
                    scale
                );
            }
        }
    }

    #[test]
    fn test_bass_offset_bounds() {
        let generator = MelodyGenerator::new();
        let loud_bass = AudioFeatures {
            bass_energy: 1.0,
            mid_energy: 1.0,
            high_energy: 1.0,
            ..AudioFeatures::default()
        };
        let config = GenerationConfig {
            steps: 64,
            audio_analysis: Some(loud_bass),
            ..GenerationConfig::default()
        };
        let phrase = generator.generate_with(&config, &mut StdRng::seed_from_u64(5));

        for note in &phrase.notes {
            let interval = note.pitch as i32 - 60 - 2;
            assert!(ScaleType::Major.intervals().contains(&(interval as u8)));
        }
    }

    #[test]
    fn test_notes_are_well_formed_and_ordered() {
        let generator = MelodyGenerator::new();
        let config = GenerationConfig {
            steps: 128,
            temperature: 2.0,
            ..GenerationConfig::default()
        };
        let phrase = generator.generate_with(&config, &mut StdRng::seed_from_u64(17));

        for pair in phrase.notes.windows(2) {
            assert!(pair[0].start_time <= pair[1].start_time);
        }
        for note in &phrase.notes {
            assert!(note.duration > 0.0);
            assert!(note.end_time > note.start_time);
            assert!((MELODY_PITCH_RANGE.0..=MELODY_PITCH_RANGE.1).contains(&note.pitch));
            assert!((0.0..=1.0).contains(&note.velocity));
        }
    }

    #[test]
    fn test_same_seed_same_phrase() {
        let generator = MelodyGenerator::new();
        let config = GenerationConfig::default();
        let a = generator.generate_with(&config, &mut StdRng::seed_from_u64(99));
        let b = generator.generate_with(&config, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_silent_audio_shrinks_intensity() {
        let generator = MelodyGenerator::new();
        let silent = GenerationConfig {
            audio_analysis: Some(AudioFeatures::default()),
            ..GenerationConfig::default()
        };
        let neutral = GenerationConfig::default();

        let quiet = generator.generate_with(&silent, &mut StdRng::seed_from_u64(1));
        let normal = generator.generate_with(&neutral, &mut StdRng::seed_from_u64(1));
        assert_eq!(quiet.notes.len(), normal.notes.len());
        assert!(quiet.notes[0].duration < normal.notes[0].duration);
    }
}
