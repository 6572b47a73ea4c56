// RhythmGenerator - percussion hits from one of the style's two templates
//
// The template is chosen once per phrase. Each bar is 8 slots of half a
// beat; `steps` covers ceil(steps / 16) bars. Hits below MIN_HIT_INTENSITY
// after scaling are dropped.

use rand::rngs::StdRng;
use rand::Rng;

use super::types::{clamp_pitch, GenerationConfig, MusicalPhrase, Note};
use super::{GeneratorKind, PhraseGenerator};

/// MIDI C2, the unshifted percussion note
const PERCUSSION_BASE: i32 = 36;

/// Inclusive pitch range of percussion notes
pub const RHYTHM_PITCH_RANGE: (u8, u8) = (36, 48);

pub const SLOT_BEATS: f64 = 0.5;
pub const SLOTS_PER_BAR: usize = 8;
const STEPS_PER_BAR: usize = 16;
const HIT_BEATS: f64 = 0.25;
const MIN_HIT_INTENSITY: f32 = 0.1;

#[derive(Debug, Default)]
pub struct RhythmGenerator;

impl RhythmGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> MusicalPhrase {
        let mut phrase = MusicalPhrase::for_config(config);
        let influence = config.influence();
        let patterns = config.style.percussion_patterns();
        let template = &patterns[rng.gen_range(0..patterns.len())];

        let (bass_boost, pitch_offset) = if influence.present {
            (
                1.0 + (influence.bass - 0.5) * 0.5,
                (influence.mid * 12.0).floor() as i32,
            )
        } else {
            (1.0, 0)
        };
        let pitch = clamp_pitch(
            PERCUSSION_BASE + pitch_offset,
            RHYTHM_PITCH_RANGE.0,
            RHYTHM_PITCH_RANGE.1,
        );

        let bars = config.steps.div_ceil(STEPS_PER_BAR);
        for bar in 0..bars {
            for (slot, &weight) in template.iter().enumerate() {
                if weight <= 0.0 {
                    continue;
                }

                let factor = if rng.gen::<f32>() < config.rhythm_complexity {
                    rng.gen_range(0.5..=1.0)
                } else {
                    1.0
                };
                let intensity = weight * factor * bass_boost;
                if intensity <= MIN_HIT_INTENSITY {
                    continue;
                }

                let start = (bar * SLOTS_PER_BAR + slot) as f64 * SLOT_BEATS;
                phrase
                    .notes
                    .push(Note::new(pitch, intensity.min(1.0), start, HIT_BEATS));
            }
        }

        phrase
    }
}

impl PhraseGenerator for RhythmGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Rhythm
    }

    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> MusicalPhrase {
        self.generate_with(config, rng)
    }
}
