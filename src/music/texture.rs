// TextureGenerator - sustained background layers
//
// Layer count grows with overall energy: ceil(energy * 4) + 2. Layers are
// staggered evenly across the texture length and each one holds for
// 80-120% of its slot, so neighbours overlap into a continuous bed.

use rand::rngs::StdRng;
use rand::Rng;

use super::theory::Style;
use super::types::{clamp_pitch, GenerationConfig, MusicalPhrase, Note};
use super::{GeneratorKind, PhraseGenerator};

const TEXTURE_ROOT: i32 = 48;

/// Inclusive pitch range of texture layers
pub const TEXTURE_PITCH_RANGE: (u8, u8) = (24, 96);

/// Shortest texture, in beats
const MIN_TEXTURE_BEATS: f64 = 8.0;
const BEATS_PER_STEP: f64 = 0.5;

#[derive(Debug, Default)]
pub struct TextureGenerator;

impl TextureGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Number of layers for a given energy level (2..=6)
    pub fn layer_count(energy: f32) -> usize {
        (energy.clamp(0.0, 1.0) * 4.0).ceil() as usize + 2
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> MusicalPhrase {
        let mut phrase = MusicalPhrase::for_config(config);
        let influence = config.influence();
        let intervals = config.scale_type.intervals();
        let root = TEXTURE_ROOT + config.key_signature.value() as i32;

        let layers = Self::layer_count(influence.energy);
        let total_beats = (config.steps as f64 * BEATS_PER_STEP).max(MIN_TEXTURE_BEATS);
        let slot = total_beats / layers as f64;
        let velocity = (0.15 + influence.treble * 0.2 + influence.mid * 0.15).clamp(0.05, 0.6);

        for layer in 0..layers {
            let degree = rng.gen_range(0..intervals.len());
            let octave = rng.gen_range(0..2) * 12;
            let spread = style_spread(config.style, layer, rng);
            let pitch = clamp_pitch(
                root + intervals[degree] as i32 + octave + spread,
                TEXTURE_PITCH_RANGE.0,
                TEXTURE_PITCH_RANGE.1,
            );

            let start = layer as f64 * slot;
            let duration = slot * rng.gen_range(0.8..=1.2);
            phrase
                .notes
                .push(Note::new(pitch, velocity, start, duration));
        }

        phrase
    }
}

/// Style-specific pitch spread for one layer, in semitones
fn style_spread<R: Rng + ?Sized>(style: Style, layer: usize, rng: &mut R) -> i32 {
    match style {
        Style::Ambient => rng.gen_range(-12..=12),
        Style::Experimental => rng.gen_range(-2..=2),
        Style::Classical => [0, 4, 7][layer % 3],
        Style::Jazz => [0, 3, 7, 10][layer % 4],
        // octave stacks
        Style::Electronic => (layer % 3) as i32 * 12 - 12,
    }
}

impl PhraseGenerator for TextureGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Texture
    }

    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> MusicalPhrase {
        self.generate_with(config, rng)
    }
}
