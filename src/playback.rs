// Playback boundary - hands generated phrases to a synthesis collaborator
//
// The core never produces audio. A PlaybackSink receives each phrase with
// the instrument it should be voiced on; ScheduledEvent converts a note from
// beats and MIDI pitch into seconds and Hz using the phrase tempo.

use serde::{Deserialize, Serialize};

use crate::engine::Composition;
use crate::music::{midi_to_frequency, GeneratorKind, MusicalPhrase, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Lead,
    Pad,
    Percussion,
    Texture,
}

impl InstrumentKind {
    /// Instrument a generator's phrase is voiced on
    pub fn for_generator(kind: GeneratorKind) -> Self {
        match kind {
            GeneratorKind::Melody => InstrumentKind::Lead,
            GeneratorKind::Harmony => InstrumentKind::Pad,
            GeneratorKind::Rhythm => InstrumentKind::Percussion,
            GeneratorKind::Texture => InstrumentKind::Texture,
        }
    }
}

/// A note resolved to wall-clock time and frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub frequency_hz: f32,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub velocity: f32,
}

impl ScheduledEvent {
    /// # Arguments
    /// * `note` - Note with times in beats
    /// * `tempo` - Beats per minute; non-positive tempos are treated as 120
    pub fn from_note(note: &Note, tempo: f32) -> Self {
        let seconds_per_beat = 60.0 / effective_tempo(tempo);
        Self {
            frequency_hz: midi_to_frequency(note.pitch),
            start_seconds: note.start_time * seconds_per_beat,
            duration_seconds: note.duration * seconds_per_beat,
            velocity: note.velocity,
        }
    }
}

fn effective_tempo(tempo: f32) -> f64 {
    if tempo.is_finite() && tempo > 0.0 {
        tempo as f64
    } else {
        120.0
    }
}

/// Events for every note of a phrase, in phrase order
pub fn schedule_phrase(phrase: &MusicalPhrase) -> Vec<ScheduledEvent> {
    phrase
        .notes
        .iter()
        .map(|note| ScheduledEvent::from_note(note, phrase.tempo))
        .collect()
}

/// External playback collaborator
pub trait PlaybackSink {
    fn schedule(&mut self, phrase: &MusicalPhrase, instrument: InstrumentKind);
}

/// Sink that records every scheduled event, for tests and offline rendering
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<(InstrumentKind, ScheduledEvent)>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[(InstrumentKind, ScheduledEvent)] {
        &self.events
    }

    pub fn events_for(&self, instrument: InstrumentKind) -> impl Iterator<Item = &ScheduledEvent> {
        self.events
            .iter()
            .filter(move |(kind, _)| *kind == instrument)
            .map(|(_, event)| event)
    }

    /// End of the last event, in seconds
    pub fn total_seconds(&self) -> f64 {
        self.events
            .iter()
            .map(|(_, event)| event.start_seconds + event.duration_seconds)
            .fold(0.0, f64::max)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PlaybackSink for EventRecorder {
    fn schedule(&mut self, phrase: &MusicalPhrase, instrument: InstrumentKind) {
        self.events.extend(
            schedule_phrase(phrase)
                .into_iter()
                .map(|event| (instrument, event)),
        );
    }
}

impl Composition {
    /// Schedule every present phrase on its instrument
    ///
    /// # Returns
    /// Number of phrases handed to the sink
    pub fn schedule_all<S: PlaybackSink + ?Sized>(&self, sink: &mut S) -> usize {
        let mut scheduled = 0;
        for (kind, phrase) in self.phrases() {
            sink.schedule(phrase, InstrumentKind::for_generator(kind));
            scheduled += 1;
        }
        log::debug!("[Playback] Scheduled {} phrases", scheduled);
        scheduled
    }
}
