// Music theory tables and pitch helpers
//
// Process-wide constant data used by the generators:
// - scale interval tables for the six supported scales
// - per-style chord progression templates (chord-degree sets)
// - per-style rhythm intensity templates for melody and percussion
// - MIDI pitch <-> note name <-> frequency conversion
//
// Styles and scales are closed enums; every table lookup is an exhaustive
// match, so there is no fallback path for unknown names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Sharp-spelled pitch class names, indexed by pitch class
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Supported scale types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Major,
    Minor,
    Dorian,
    Mixolydian,
    Pentatonic,
    Blues,
}

impl ScaleType {
    pub const ALL: [ScaleType; 6] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::Dorian,
        ScaleType::Mixolydian,
        ScaleType::Pentatonic,
        ScaleType::Blues,
    ];

    /// Semitone intervals from the root to each scale degree
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Pentatonic => &[0, 2, 4, 7, 9],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    pub fn len(self) -> usize {
        self.intervals().len()
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
            ScaleType::Dorian => "dorian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::Pentatonic => "pentatonic",
            ScaleType::Blues => "blues",
        }
    }

    /// Semitone offset of an arbitrary (possibly negative or > len) degree
    ///
    /// Degrees beyond the scale wrap into the next octave.
    pub fn degree_offset(self, degree: i32) -> i32 {
        let len = self.len() as i32;
        let octave = degree.div_euclid(len);
        let index = degree.rem_euclid(len) as usize;
        octave * 12 + self.intervals()[index] as i32
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ScaleType::ALL
            .iter()
            .copied()
            .find(|scale| scale.name() == lowered)
            .ok_or_else(|| GenerationError::UnknownScale {
                value: s.to_string(),
            })
    }
}

/// Supported generation styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Classical,
    Jazz,
    Electronic,
    Ambient,
    Experimental,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Classical,
        Style::Jazz,
        Style::Electronic,
        Style::Ambient,
        Style::Experimental,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Style::Classical => "classical",
            Style::Jazz => "jazz",
            Style::Electronic => "electronic",
            Style::Ambient => "ambient",
            Style::Experimental => "experimental",
        }
    }

    /// Default tempo in beats per minute
    pub fn tempo(self) -> f32 {
        match self {
            Style::Classical => 96.0,
            Style::Jazz => 120.0,
            Style::Electronic => 128.0,
            Style::Ambient => 72.0,
            Style::Experimental => 104.0,
        }
    }

    /// Chord progression as scale-degree sets, one per chord
    pub fn progression(self) -> &'static [&'static [i32]] {
        match self {
            // I IV V I
            Style::Classical => &[&[0, 2, 4], &[3, 5, 7], &[4, 6, 8], &[0, 2, 4]],
            // ii7 V7 Imaj7 vi7
            Style::Jazz => &[&[1, 3, 5, 7], &[4, 6, 8, 10], &[0, 2, 4, 6], &[5, 7, 9, 11]],
            // i VI III VII
            Style::Electronic => &[&[0, 2, 4], &[5, 7, 9], &[2, 4, 6], &[6, 8, 10]],
            // Iadd9 Vadd9 viadd9 IVadd9
            Style::Ambient => &[&[0, 2, 4, 8], &[4, 6, 8, 12], &[5, 7, 9, 13], &[3, 5, 7, 11]],
            // stacked fourths
            Style::Experimental => &[&[0, 3, 6], &[1, 4, 7], &[2, 5, 8], &[4, 7, 10]],
        }
    }

    /// 8-slot melody rhythm template (one per style)
    pub fn melody_rhythm(self) -> &'static [f32; 8] {
        &MELODY_RHYTHMS[self as usize]
    }

    /// The two 8-slot percussion templates for this style
    pub fn percussion_patterns(self) -> &'static [[f32; 8]; 2] {
        match self {
            Style::Classical => &[
                [1.0, 0.0, 0.0, 0.0, 0.6, 0.0, 0.0, 0.0],
                [1.0, 0.0, 0.4, 0.0, 0.7, 0.0, 0.4, 0.0],
            ],
            Style::Jazz => &[
                [0.9, 0.0, 0.5, 0.7, 0.9, 0.0, 0.5, 0.7],
                [0.8, 0.0, 0.6, 0.0, 0.8, 0.4, 0.6, 0.0],
            ],
            Style::Electronic => &[
                [1.0, 0.0, 0.5, 0.0, 1.0, 0.0, 0.5, 0.0],
                [1.0, 0.3, 0.7, 0.3, 1.0, 0.3, 0.7, 0.3],
            ],
            Style::Ambient => &[
                [0.6, 0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 0.0],
                [0.5, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.0],
            ],
            Style::Experimental => &[
                [1.0, 0.0, 0.0, 0.6, 0.0, 0.8, 0.0, 0.4],
                [0.7, 0.5, 0.0, 0.0, 0.9, 0.0, 0.6, 0.6],
            ],
        }
    }
}

/// Melody rhythm templates, indexed by `Style as usize`
const MELODY_RHYTHMS: [[f32; 8]; 5] = [
    [1.0, 0.0, 0.6, 0.0, 0.8, 0.0, 0.6, 0.4],
    [0.9, 0.0, 0.7, 0.5, 0.0, 0.8, 0.6, 0.0],
    [1.0, 0.5, 0.0, 0.5, 1.0, 0.5, 0.0, 0.5],
    [0.7, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0],
    [0.8, 0.3, 0.0, 0.9, 0.0, 0.4, 0.7, 0.0],
];

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Style::ALL
            .iter()
            .copied()
            .find(|style| style.name() == lowered)
            .ok_or_else(|| GenerationError::UnknownStyle {
                value: s.to_string(),
            })
    }
}

/// A key signature's tonic, as a pitch class (0 = C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    pub fn new(pitch_class: u8) -> Self {
        PitchClass(pitch_class % 12)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pitch_class(s.trim())
            .filter(|(_, rest)| rest.is_empty())
            .map(|(pc, _)| PitchClass::new(pc as u8))
            .ok_or_else(|| GenerationError::UnknownKey {
                value: s.to_string(),
            })
    }
}

impl Serialize for PitchClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PitchClass {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Split a note spelling into (letter pitch class, accidental offset, rest)
fn parse_spelling(s: &str) -> Option<(i32, i32, &str)> {
    let mut chars = s.chars();
    let letter = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = &s[1..];
    let accidental_len = rest.chars().take_while(|&c| c == '#' || c == 'b').count();
    let accidental: i32 = rest[..accidental_len]
        .chars()
        .map(|c| if c == '#' { 1 } else { -1 })
        .sum();

    Some((letter, accidental, &rest[accidental_len..]))
}

/// Parse a bare pitch class spelling ("C", "F#", "Bb")
fn parse_pitch_class(s: &str) -> Option<(i32, &str)> {
    parse_spelling(s).map(|(letter, accidental, rest)| ((letter + accidental).rem_euclid(12), rest))
}

/// Convert a MIDI pitch to a sharp-spelled note name (60 -> "C4", 0 -> "C-1")
pub fn midi_to_note_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[(pitch % 12) as usize], octave)
}

/// Parse a note name ("C4", "F#3", "Bb-1") into a MIDI pitch
///
/// Accidentals keep the written octave, so "Cb4" is 59 and "B#3" is 60.
/// Returns `None` for malformed names or pitches outside 0-127.
pub fn note_name_to_midi(name: &str) -> Option<u8> {
    let (letter, accidental, octave_text) = parse_spelling(name.trim())?;
    let octave: i32 = octave_text.parse().ok()?;

    let midi = (octave + 1) * 12 + letter + accidental;
    u8::try_from(midi).ok().filter(|&p| p <= 127)
}

/// Convert a MIDI pitch to frequency in Hz (A4 = 69 = 440 Hz)
pub fn midi_to_frequency(pitch: u8) -> f32 {
    440.0 * 2f32.powf((pitch as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name_round_trip_for_all_midi_values() {
        for pitch in 0u8..=127 {
            let name = midi_to_note_name(pitch);
            assert_eq!(note_name_to_midi(&name), Some(pitch), "round trip of {}", name);
        }
    }

    #[test]
    fn test_note_names() {
        assert_eq!(midi_to_note_name(60), "C4");
        assert_eq!(midi_to_note_name(0), "C-1");
        assert_eq!(midi_to_note_name(69), "A4");
        assert_eq!(midi_to_note_name(127), "G9");
    }

    #[test]
    fn test_flat_and_sharp_spellings() {
        assert_eq!(note_name_to_midi("Bb3"), Some(58));
        assert_eq!(note_name_to_midi("A#3"), Some(58));
        assert_eq!(note_name_to_midi("Cb4"), Some(59));
        assert_eq!(note_name_to_midi("B#3"), Some(60));
    }

    #[test]
    fn test_invalid_note_names() {
        assert_eq!(note_name_to_midi(""), None);
        assert_eq!(note_name_to_midi("H4"), None);
        assert_eq!(note_name_to_midi("C"), None);
        assert_eq!(note_name_to_midi("G#9"), None);
        assert_eq!(note_name_to_midi("Cb-1"), None);
    }

    #[test]
    fn test_midi_to_frequency() {
        assert!((midi_to_frequency(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_frequency(81) - 880.0).abs() < 1e-2);
        assert!((midi_to_frequency(60) - 261.626).abs() < 1e-2);
    }

    #[test]
    fn test_scale_degree_offset_wraps_octaves() {
        assert_eq!(ScaleType::Major.degree_offset(0), 0);
        assert_eq!(ScaleType::Major.degree_offset(7), 12);
        assert_eq!(ScaleType::Major.degree_offset(-1), -1);
        assert_eq!(ScaleType::Pentatonic.degree_offset(6), 14);
    }

    #[test]
    fn test_style_and_scale_parsing() {
        assert_eq!("Jazz".parse::<Style>(), Ok(Style::Jazz));
        assert_eq!(" blues ".parse::<ScaleType>(), Ok(ScaleType::Blues));
        assert!(matches!(
            "polka".parse::<Style>(),
            Err(GenerationError::UnknownStyle { .. })
        ));
        assert!(matches!(
            "lydian".parse::<ScaleType>(),
            Err(GenerationError::UnknownScale { .. })
        ));
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("C".parse::<PitchClass>().map(PitchClass::value), Ok(0));
        assert_eq!("F#".parse::<PitchClass>().map(PitchClass::value), Ok(6));
        assert_eq!("Bb".parse::<PitchClass>().map(PitchClass::value), Ok(10));
        assert!("X".parse::<PitchClass>().is_err());
        assert!("C4".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Style::Electronic).unwrap();
        assert_eq!(json, "\"electronic\"");
        let scale: ScaleType = serde_json::from_str("\"dorian\"").unwrap();
        assert_eq!(scale, ScaleType::Dorian);
        assert!(serde_json::from_str::<Style>("\"polka\"").is_err());
    }

    #[test]
    fn test_tables_are_well_formed() {
        for style in Style::ALL {
            assert_eq!(style.progression().len(), 4);
            for pattern in style.percussion_patterns() {
                assert!(pattern.iter().all(|&v| v == 0.0 || v > 0.1));
            }
            assert!(style.melody_rhythm().iter().any(|&v| v > 0.0));
        }
        for scale in ScaleType::ALL {
            assert_eq!(scale.intervals()[0], 0);
            assert!(scale.intervals().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
