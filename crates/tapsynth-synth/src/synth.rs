//! Minimal voice pool.
//!
//! [`Synthesiser`] owns a fixed array of [`SynthVoice`]s, the sounds they may
//! play and a handle to the shared parameter store. It assigns notes to the
//! first free voice (a note is dropped when every voice is busy; there is no
//! stealing), takes one parameter snapshot per block, and splits each block
//! at timestamped MIDI events so notes start and stop on the exact sample.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use tapsynth_core::{AudioBuffer, ProcessSpec};

use crate::sound::Sound;
use crate::store::SharedParams;
use crate::voice::{SynthVoice, SynthesiserVoice, VoiceState};

/// Note and controller messages understood by the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiMessage {
    /// Key pressed.
    NoteOn {
        /// MIDI channel (1..=16).
        channel: u8,
        /// Note number.
        note: u8,
        /// Velocity, 0.0..=1.0.
        velocity: f32,
    },
    /// Key released.
    NoteOff {
        /// MIDI channel (1..=16).
        channel: u8,
        /// Note number.
        note: u8,
        /// Release velocity, 0.0..=1.0.
        velocity: f32,
    },
    /// Release every note.
    AllNotesOff {
        /// Let release tails finish.
        allow_tail_off: bool,
    },
    /// Continuous controller change.
    Controller {
        /// MIDI channel (1..=16).
        channel: u8,
        /// Controller number.
        controller: u8,
        /// Controller value.
        value: u8,
    },
    /// Pitch-wheel change (0..=16383).
    PitchWheel {
        /// MIDI channel (1..=16).
        channel: u8,
        /// Wheel position.
        value: i32,
    },
}

/// A MIDI message at a sample offset within the block being rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MidiEvent {
    /// Offset from the first sample of the block.
    pub offset: usize,
    /// The message.
    pub message: MidiMessage,
}

impl MidiEvent {
    /// Event at `offset`.
    pub fn new(offset: usize, message: MidiMessage) -> Self {
        Self { offset, message }
    }

    /// Note-on on channel 1.
    pub fn note_on(offset: usize, note: u8, velocity: f32) -> Self {
        Self::new(
            offset,
            MidiMessage::NoteOn {
                channel: 1,
                note,
                velocity,
            },
        )
    }

    /// Note-off on channel 1.
    pub fn note_off(offset: usize, note: u8) -> Self {
        Self::new(
            offset,
            MidiMessage::NoteOff {
                channel: 1,
                note,
                velocity: 0.0,
            },
        )
    }
}

/// Centre position of the pitch wheel.
pub const PITCH_WHEEL_CENTRE: i32 = 8192;

/// Fixed-size voice pool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tapsynth_core::{AudioBuffer, ProcessSpec};
/// use tapsynth_synth::{MidiEvent, SharedParams, Sound, SynthSound, Synthesiser};
///
/// let params = Arc::new(SharedParams::new());
/// let mut synth: Synthesiser<8> = Synthesiser::new(Arc::clone(&params));
/// synth.add_sound(Sound::from(SynthSound::new()));
/// synth.prepare_to_play(&ProcessSpec::new(48000.0, 512, 2));
///
/// let mut out = AudioBuffer::new(2, 512);
/// let events = [MidiEvent::note_on(0, 60, 1.0), MidiEvent::note_on(128, 64, 1.0)];
/// synth.render_next_block(&mut out, &events, 0, 512);
/// assert_eq!(synth.active_voice_count(), 2);
/// ```
#[derive(Debug)]
pub struct Synthesiser<const N: usize> {
    voices: [SynthVoice; N],
    sounds: Vec<Sound>,
    params: Arc<SharedParams>,
    pitch_wheel: [i32; 16],
}

impl<const N: usize> Synthesiser<N> {
    /// Pool of `N` unprepared voices reading `params`.
    pub fn new(params: Arc<SharedParams>) -> Self {
        let snapshot = params.snapshot();
        Self {
            voices: core::array::from_fn(|_| {
                let mut voice = SynthVoice::new();
                voice.set_params(&snapshot);
                voice
            }),
            sounds: Vec::new(),
            params,
            pitch_wheel: [PITCH_WHEEL_CENTRE; 16],
        }
    }

    /// Register a sound voices may be asked to play.
    pub fn add_sound(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    /// Registered sounds.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// Shared parameter store.
    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    /// Prepare every voice for a session.
    pub fn prepare_to_play(&mut self, spec: &ProcessSpec) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            voices = N,
            sample_rate = spec.sample_rate,
            block_size = spec.maximum_block_size,
            "synthesiser prepare"
        );

        for voice in &mut self.voices {
            voice.prepare_to_play(spec);
        }
    }

    /// Set how long a voice takes to glide to a new output gain. Zero
    /// applies gain changes at the next block.
    pub fn set_gain_ramp(&mut self, seconds: f32) {
        for voice in &mut self.voices {
            voice.set_gain_ramp(seconds);
        }
    }

    /// Number of voices.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Voices with a note assigned.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_voice_active()).count()
    }

    /// All voices.
    pub fn voices(&self) -> &[SynthVoice; N] {
        &self.voices
    }

    /// Start `note` on the first free voice able to play a sound that
    /// applies to it. Voices still sounding the same note are released
    /// first. Returns the index of the voice used, or `None` if the note
    /// was dropped.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) -> Option<usize> {
        let wheel = self.pitch_wheel(channel);

        for voice in &mut self.voices {
            if voice.current_note() == Some(note) {
                voice.stop_note(1.0, true);
            }
        }

        let sounds = self
            .sounds
            .iter()
            .filter(|s| s.applies_to_note(note) && s.applies_to_channel(channel));
        for sound in sounds {
            if let Some(index) = self
                .voices
                .iter()
                .position(|v| !v.is_voice_active() && v.can_play_sound(sound))
            {
                self.voices[index].start_note(note, velocity, sound, wheel);
                return Some(index);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(note, channel, "no free voice for note, dropped");
        None
    }

    /// Stop every voice playing `note`. With tail-off, voices already
    /// releasing are left alone.
    pub fn note_off(&mut self, note: u8, velocity: f32, allow_tail_off: bool) {
        for voice in &mut self.voices {
            if voice.current_note() == Some(note)
                && (!allow_tail_off || voice.state() != VoiceState::Releasing)
            {
                voice.stop_note(velocity, allow_tail_off);
            }
        }
    }

    /// Stop every voice.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in &mut self.voices {
            voice.stop_note(0.0, allow_tail_off);
        }
    }

    fn pitch_wheel(&self, channel: u8) -> i32 {
        let index = usize::from(channel.clamp(1, 16)) - 1;
        self.pitch_wheel[index]
    }

    fn handle_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                if velocity > 0.0 {
                    self.note_on(channel, note, velocity);
                } else {
                    self.note_off(note, 0.0, true);
                }
            }
            MidiMessage::NoteOff { note, velocity, .. } => self.note_off(note, velocity, true),
            MidiMessage::AllNotesOff { allow_tail_off } => self.all_notes_off(allow_tail_off),
            MidiMessage::Controller {
                controller, value, ..
            } => {
                for voice in &mut self.voices {
                    voice.controller_moved(controller, value);
                }
            }
            MidiMessage::PitchWheel { channel, value } => {
                let index = usize::from(channel.clamp(1, 16)) - 1;
                self.pitch_wheel[index] = value;
                for voice in &mut self.voices {
                    voice.pitch_wheel_moved(value);
                }
            }
        }
    }

    fn render_voices(&mut self, output: &mut AudioBuffer, start_sample: usize, num_samples: usize) {
        if num_samples == 0 {
            return;
        }
        for voice in &mut self.voices {
            voice.render_next_block(output, start_sample, num_samples);
        }
    }

    /// Render `num_samples` frames into `output` from `start_sample`,
    /// handling `events` at their offsets.
    ///
    /// Events must be sorted by offset; offsets past the end of the block are
    /// handled after the last sample. Output is added to, never overwritten.
    pub fn render_next_block(
        &mut self,
        output: &mut AudioBuffer,
        events: &[MidiEvent],
        start_sample: usize,
        num_samples: usize,
    ) {
        let snapshot = self.params.snapshot();
        for voice in &mut self.voices {
            voice.set_params(&snapshot);
        }

        let end = start_sample.saturating_add(num_samples);
        let mut position = start_sample;
        for event in events {
            let at = start_sample.saturating_add(event.offset).clamp(position, end);
            self.render_voices(output, position, at - position);
            position = at;
            self.handle_message(event.message);
        }
        self.render_voices(output, position, end - position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AdsrParams;
    use crate::sound::{NoteRange, SampledSound, SynthSound};

    fn synth<const N: usize>() -> Synthesiser<N> {
        let mut synth = Synthesiser::new(Arc::new(SharedParams::new()));
        synth.add_sound(Sound::from(SynthSound::new()));
        synth.prepare_to_play(&ProcessSpec::new(48000.0, 256, 2));
        synth
    }

    #[test]
    fn notes_take_first_free_voice() {
        let mut synth: Synthesiser<4> = synth();
        assert_eq!(synth.note_on(1, 60, 1.0), Some(0));
        assert_eq!(synth.note_on(1, 64, 1.0), Some(1));
        assert_eq!(synth.active_voice_count(), 2);
    }

    #[test]
    fn full_pool_drops_notes() {
        let mut synth: Synthesiser<2> = synth();
        synth.note_on(1, 60, 1.0);
        synth.note_on(1, 62, 1.0);
        assert_eq!(synth.note_on(1, 64, 1.0), None);
        assert_eq!(synth.active_voice_count(), 2);
        assert!(synth.voices().iter().all(|v| v.current_note() != Some(64)));
    }

    #[test]
    fn no_matching_sound_drops_note() {
        let mut synth: Synthesiser<2> = Synthesiser::new(Arc::new(SharedParams::new()));
        synth.add_sound(Sound::from(SampledSound::new(60, NoteRange::all())));
        synth.add_sound(Sound::from(SynthSound::with_range(NoteRange::notes(0..=59))));
        synth.prepare_to_play(&ProcessSpec::new(48000.0, 64, 2));

        assert_eq!(synth.note_on(1, 72, 1.0), None);
        assert_eq!(synth.note_on(1, 48, 1.0), Some(0));
    }

    #[test]
    fn repeated_note_releases_previous_voice() {
        let mut synth: Synthesiser<4> = synth();
        synth.note_on(1, 60, 1.0);
        synth.note_on(1, 60, 1.0);
        let playing: Vec<_> = synth
            .voices()
            .iter()
            .filter(|v| v.current_note() == Some(60))
            .map(SynthVoice::state)
            .collect();
        assert_eq!(playing.len(), 2);
        assert!(playing.contains(&VoiceState::Releasing));
        assert!(playing.contains(&VoiceState::Sounding));
    }

    #[test]
    fn hard_note_off_frees_voice() {
        let mut synth: Synthesiser<2> = synth();
        synth.note_on(1, 60, 1.0);
        synth.note_off(60, 0.0, false);
        assert_eq!(synth.active_voice_count(), 0);
        synth.note_off(60, 0.0, false);
        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn note_starts_at_event_offset() {
        let mut synth: Synthesiser<2> = synth();
        let mut out = AudioBuffer::new(2, 256);
        synth.render_next_block(&mut out, &[MidiEvent::note_on(100, 69, 1.0)], 0, 256);

        assert!(out.channel(0)[..101].iter().all(|&s| s == 0.0));
        assert!(out.channel(0)[101..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn huge_offsets_are_handled_at_block_end() {
        let mut synth: Synthesiser<2> = synth();
        let mut out = AudioBuffer::new(2, 64);
        synth.render_next_block(&mut out, &[MidiEvent::note_on(usize::MAX, 60, 1.0)], 8, 32);

        assert_eq!(out.magnitude(0, 64), 0.0);
        assert_eq!(synth.active_voice_count(), 1);

        synth.render_next_block(&mut out, &[], usize::MAX - 4, 16);
        assert_eq!(out.magnitude(0, 64), 0.0);
    }

    #[test]
    fn gain_ramp_reaches_every_voice() {
        let mut synth: Synthesiser<3> = synth();
        synth.prepare_to_play(&ProcessSpec::new(48000.0, 64, 2));
        synth.set_gain_ramp(0.01);

        synth.params().set("GAIN", 0.9).unwrap();
        let mut out = AudioBuffer::new(2, 64);
        synth.render_next_block(&mut out, &[], 0, 64);
        assert!(synth.voices().iter().all(|v| v.gain().is_ramping()));
    }

    #[test]
    fn snapshot_reaches_voices_each_block() {
        let mut synth: Synthesiser<2> = synth();
        synth.params().set("GAIN", 0.9).unwrap();
        let mut out = AudioBuffer::new(2, 64);
        synth.render_next_block(&mut out, &[], 0, 64);
        assert!(synth.voices().iter().all(|v| v.params().gain == 0.9));
    }

    #[test]
    fn all_notes_off_with_tail_releases() {
        let mut synth: Synthesiser<4> = synth();
        synth.params().set("RELEASE", 0.5).unwrap();
        let mut out = AudioBuffer::new(2, 256);
        synth.render_next_block(
            &mut out,
            &[MidiEvent::note_on(0, 60, 1.0), MidiEvent::note_on(0, 67, 1.0)],
            0,
            256,
        );
        synth.all_notes_off(true);
        assert_eq!(synth.active_voice_count(), 2);
        synth.all_notes_off(false);
        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let mut synth: Synthesiser<2> = synth();
        let mut params = crate::params::VoiceParams::default();
        params.amp_env = AdsrParams::new(0.0, 0.0, 1.0, 0.0);
        synth.params().apply(&params);

        let mut out = AudioBuffer::new(2, 256);
        synth.render_next_block(
            &mut out,
            &[MidiEvent::note_on(0, 60, 1.0), MidiEvent::note_on(64, 60, 0.0)],
            0,
            256,
        );
        assert_eq!(synth.active_voice_count(), 0);
    }
}
