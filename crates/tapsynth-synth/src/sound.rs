//! Sound descriptions a voice can be asked to play.
//!
//! The set is closed: a voice decides whether it can play a sound by
//! matching on the variant.

use core::ops::RangeInclusive;

/// Key and MIDI-channel applicability shared by every sound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteRange {
    notes: RangeInclusive<u8>,
    /// `None` answers on every channel
    channel: Option<u8>,
}

impl NoteRange {
    /// Every note on every channel.
    pub fn all() -> Self {
        Self {
            notes: 0..=127,
            channel: None,
        }
    }

    /// Restrict to `notes`, on every channel.
    pub fn notes(notes: RangeInclusive<u8>) -> Self {
        Self {
            notes,
            channel: None,
        }
    }

    /// Restrict to one MIDI channel (1..=16).
    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    fn contains_note(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    fn contains_channel(&self, channel: u8) -> bool {
        self.channel.is_none_or(|c| c == channel)
    }
}

impl Default for NoteRange {
    fn default() -> Self {
        Self::all()
    }
}

/// Oscillator-based sound rendered by [`SynthVoice`](crate::SynthVoice).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynthSound {
    range: NoteRange,
}

impl SynthSound {
    /// Synth sound answering every note on every channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Synth sound limited to `range`.
    pub fn with_range(range: NoteRange) -> Self {
        Self { range }
    }
}

/// Sample-playback sound. Synth voices cannot play it; it exists so the pool
/// can hold sounds meant for other voice types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampledSound {
    range: NoteRange,
    root_note: u8,
}

impl SampledSound {
    /// Sampled sound pitched at `root_note`, answering `range`.
    pub fn new(root_note: u8, range: NoteRange) -> Self {
        Self { range, root_note }
    }

    /// Note at which the sample plays back unshifted.
    pub fn root_note(&self) -> u8 {
        self.root_note
    }
}

/// Everything a voice pool may hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sound {
    /// Rendered by synth voices.
    Synth(SynthSound),
    /// Rendered by sample-playback voices.
    Sampled(SampledSound),
}

impl Sound {
    fn range(&self) -> &NoteRange {
        match self {
            Sound::Synth(s) => &s.range,
            Sound::Sampled(s) => &s.range,
        }
    }

    /// `true` if this sound should play for `note`.
    pub fn applies_to_note(&self, note: u8) -> bool {
        self.range().contains_note(note)
    }

    /// `true` if this sound should play for events on MIDI `channel`.
    pub fn applies_to_channel(&self, channel: u8) -> bool {
        self.range().contains_channel(channel)
    }
}

impl From<SynthSound> for Sound {
    fn from(sound: SynthSound) -> Self {
        Sound::Synth(sound)
    }
}

impl From<SampledSound> for Sound {
    fn from(sound: SampledSound) -> Self {
        Sound::Sampled(sound)
    }
}
