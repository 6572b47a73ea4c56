// Music module - procedural phrase generation
//
// Four independent generators turn one GenerationConfig into symbolic note
// sequences. Each generator owns its lookup data, keeps no mutable state
// between calls and draws all randomness from the caller's seeded RNG, so
// the same config and seed always produce the same phrase.
//
// Module organization:
// - theory: scales, progressions, rhythm templates, pitch naming
// - types: GenerationConfig, Note, MusicalPhrase, AudioInfluence
// - markov: degree transition table used by the melody generator
// - melody / harmony / rhythm / texture: the generators

pub mod harmony;
pub mod markov;
pub mod melody;
pub mod rhythm;
pub mod texture;
pub mod theory;
pub mod types;

pub use harmony::HarmonyGenerator;
pub use markov::MarkovChain;
pub use melody::MelodyGenerator;
pub use rhythm::RhythmGenerator;
pub use texture::TextureGenerator;
pub use theory::{
    midi_to_frequency, midi_to_note_name, note_name_to_midi, PitchClass, ScaleType, Style,
};
pub use types::{AudioInfluence, GenerationConfig, MusicalPhrase, Note, TimeSignature};

use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Identifies one of the four phrase generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Melody,
    Harmony,
    Rhythm,
    Texture,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 4] = [
        GeneratorKind::Melody,
        GeneratorKind::Harmony,
        GeneratorKind::Rhythm,
        GeneratorKind::Texture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Melody => "melody",
            GeneratorKind::Harmony => "harmony",
            GeneratorKind::Rhythm => "rhythm",
            GeneratorKind::Texture => "texture",
        }
    }

    /// Per-generator salt mixed into the composition seed
    pub fn seed_salt(self) -> u64 {
        match self {
            GeneratorKind::Melody => 0x9E37_79B9_7F4A_7C15,
            GeneratorKind::Harmony => 0xBF58_476D_1CE4_E5B9,
            GeneratorKind::Rhythm => 0x94D0_49BB_1331_11EB,
            GeneratorKind::Texture => 0xD6E8_FEB8_6659_FD93,
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait implemented by every phrase generator
///
/// Implementations must be pure with respect to `self`: all variation comes
/// from the config and the RNG.
pub trait PhraseGenerator: Send + Sync {
    fn kind(&self) -> GeneratorKind;
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> MusicalPhrase;
}
