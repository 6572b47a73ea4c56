// HarmonyGenerator - block chords from the style's progression
//
// One chord per progression entry, CHORD_BEATS apart. Each chord tone is
// placed at 48 + key + the degree's scale offset, then spread by a voicing
// chosen from bass energy. Start times are jittered slightly in proportion
// to temperature; every tone of a chord releases together.

use rand::rngs::StdRng;
use rand::Rng;

use super::types::{clamp_pitch, GenerationConfig, MusicalPhrase, Note};
use super::{GeneratorKind, PhraseGenerator};

/// MIDI C3, the root of the harmony register
const HARMONY_ROOT: i32 = 48;

/// Inclusive pitch range of chord tones
pub const HARMONY_PITCH_RANGE: (u8, u8) = (36, 96);

/// Spacing between chord onsets, in beats
pub const CHORD_BEATS: f64 = 2.0;

/// Fraction of the chord slot each chord sounds for
const SUSTAIN_FRACTION: f64 = 0.9;

/// Peak-to-peak onset jitter at temperature 1.0, in beats
const JITTER_BEATS: f64 = 0.05;

/// Octave spread of a chord, selected from bass energy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voicing {
    /// All tones stacked within the written register
    Close,
    /// Odd voices raised an octave
    Open,
    /// Root dropped an octave, odd voices raised an octave
    Wide,
}

impl Voicing {
    pub fn from_bass(bass: f32) -> Self {
        if bass > 0.7 {
            Voicing::Wide
        } else if bass < 0.3 {
            Voicing::Close
        } else {
            Voicing::Open
        }
    }

    /// Semitone shift applied to the voice at `index` within a chord
    pub fn shift(self, index: usize) -> i32 {
        match self {
            Voicing::Close => 0,
            Voicing::Open => {
                if index % 2 == 1 {
                    12
                } else {
                    0
                }
            }
            Voicing::Wide => {
                if index == 0 {
                    -12
                } else if index % 2 == 1 {
                    12
                } else {
                    0
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct HarmonyGenerator;

impl HarmonyGenerator {
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
        let voicing = Voicing::from_bass(influence.bass);
        let root = HARMONY_ROOT + config.key_signature.value() as i32;
        let jitter_span = JITTER_BEATS * config.temperature as f64;

        for (chord_index, degrees) in config.style.progression().iter().enumerate() {
            let chord_start = chord_index as f64 * CHORD_BEATS;
            let chord_end = chord_start + CHORD_BEATS * SUSTAIN_FRACTION;

            for (voice, &degree) in degrees.iter().enumerate() {
                let pitch = clamp_pitch(
                    root + config.scale_type.degree_offset(degree) + voicing.shift(voice),
                    HARMONY_PITCH_RANGE.0,
                    HARMONY_PITCH_RANGE.1,
                );
                let jitter = (rng.gen::<f64>() - 0.5) * jitter_span;
                let start = (chord_start + jitter).max(0.0);
                let velocity = (0.4 + influence.energy * 0.4 - voice as f32 * 0.05).clamp(0.1, 1.0);

                phrase
                    .notes
                    .push(Note::new(pitch, velocity, start, chord_end - start));
            }
        }

        phrase.sort_by_start();
        phrase
    }
}

impl PhraseGenerator for HarmonyGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Harmony
    }

    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> MusicalPhrase {
        self.generate_with(config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AudioFeatures;
    use crate::music::theory::{PitchClass, Style};
    use rand::SeedableRng;

    fn chord_tones(phrase: &MusicalPhrase, chord_index: usize) -> Vec<&Note> {
        let release = chord_index as f64 * CHORD_BEATS + CHORD_BEATS * SUSTAIN_FRACTION;
        phrase
            .notes
            .iter()
            .filter(|note| (note.end_time - release).abs() < 1e-9)
            .collect()
    }

    #[test]
    fn test_ambient_yields_four_four_note_chords() {
        let config = GenerationConfig {
            style: Style::Ambient,
            ..GenerationConfig::default()
        };
        let phrase = HarmonyGenerator::new().generate_with(&config, &mut StdRng::seed_from_u64(8));

        assert_eq!(phrase.notes.len(), 16);
        for chord in 0..4 {
            assert_eq!(chord_tones(&phrase, chord).len(), 4, "chord {}", chord);
        }
    }

    #[test]
    fn test_classical_yields_triads() {
        let phrase = HarmonyGenerator::new()
            .generate_with(&GenerationConfig::default(), &mut StdRng::seed_from_u64(8));
        assert_eq!(phrase.notes.len(), 12);
        // Last chord releases at 90% of its 2-beat slot
        assert!((phrase.length_beats() - 7.8).abs() < 1e-9);
    }

    #[test]
    fn test_voicing_thresholds() {
        assert_eq!(Voicing::from_bass(0.9), Voicing::Wide);
        assert_eq!(Voicing::from_bass(0.7), Voicing::Open);
        assert_eq!(Voicing::from_bass(0.5), Voicing::Open);
        assert_eq!(Voicing::from_bass(0.3), Voicing::Open);
        assert_eq!(Voicing::from_bass(0.1), Voicing::Close);
    }

    #[test]
    fn test_close_voicing_uses_scale_offsets() {
        let config = GenerationConfig {
            temperature: 0.1,
            key_signature: PitchClass::new(2),
            audio_analysis: Some(AudioFeatures::default()),
            ..GenerationConfig::default()
        };
        let phrase = HarmonyGenerator::new().generate_with(&config, &mut StdRng::seed_from_u64(4));

        let mut first: Vec<u8> = chord_tones(&phrase, 0).iter().map(|n| n.pitch).collect();
        first.sort_unstable();
        // D major triad at D3
        assert_eq!(first, vec![50, 54, 57]);
    }

    #[test]
    fn test_notes_sorted_and_positive() {
        for style in Style::ALL {
            let config = GenerationConfig {
                style,
                temperature: 2.0,
                ..GenerationConfig::default()
            };
            let phrase =
                HarmonyGenerator::new().generate_with(&config, &mut StdRng::seed_from_u64(21));
            for pair in phrase.notes.windows(2) {
                assert!(pair[0].start_time <= pair[1].start_time);
            }
            for note in &phrase.notes {
                assert!(note.start_time >= 0.0);
                assert!(note.duration > 0.0);
                assert!(
                    (HARMONY_PITCH_RANGE.0..=HARMONY_PITCH_RANGE.1).contains(&note.pitch)
                );
            }
        }
    }
}
