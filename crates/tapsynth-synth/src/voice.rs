//! Synth voice: note lifecycle and per-block rendering.
//!
//! A [`SynthVoice`] owns one oscillator, an amplitude envelope, a filter
//! envelope, a modulated filter and a gain stage. A pool constructs voices
//! once and reassigns them to notes; nothing here allocates after
//! [`prepare_to_play`](SynthesiserVoice::prepare_to_play).
//!
//! ## Block rendering
//!
//! For each block (or sub-block, when the host block exceeds the prepared
//! maximum) the voice:
//!
//! 1. sizes its scratch buffer to the block without clearing it,
//! 2. renders the oscillator into it (overwriting every sample),
//! 3. applies the amplitude envelope sample by sample,
//! 4. pulls the filter-envelope sample for the block's first frame,
//!    refreshes the filter with it, then advances that envelope through the
//!    rest of the block so its times stay in seconds,
//! 5. runs the filter,
//! 6. applies the output gain,
//! 7. adds the scratch buffer into the output at the block offset,
//! 8. frees itself if the amplitude envelope finished during the block.

use tapsynth_core::{AudioBuffer, Gain, ProcessSpec, Processor};

use crate::envelope::{AdsrEnvelope, EnvelopeState};
use crate::filter::ModulatedFilter;
use crate::oscillator::Oscillator;
use crate::params::{FilterType, OscParams, VoiceParams};
use crate::sound::Sound;

/// Where a voice is in its note lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// Free for a new note.
    #[default]
    Idle,
    /// Note held (attack, decay or sustain).
    Sounding,
    /// Note released, tail still audible.
    Releasing,
}

/// Contract between a voice pool and the voices it owns.
pub trait SynthesiserVoice {
    /// `true` if this voice can render `sound`.
    fn can_play_sound(&self, sound: &Sound) -> bool;

    /// Begin playing `note`.
    fn start_note(&mut self, note: u8, velocity: f32, sound: &Sound, pitch_wheel: i32);

    /// Release the current note. Without tail-off, or when the tail has
    /// already finished, the voice is freed immediately.
    fn stop_note(&mut self, velocity: f32, allow_tail_off: bool);

    /// MIDI controller change for the current note.
    fn controller_moved(&mut self, controller: u8, value: u8);

    /// Pitch-wheel change for the current note (0..=16383, centre 8192).
    fn pitch_wheel_moved(&mut self, value: i32);

    /// Configure for a session. May allocate; never called on the audio
    /// thread.
    fn prepare_to_play(&mut self, spec: &ProcessSpec);

    /// Add `num_samples` frames of output into `output` from `start_sample`.
    fn render_next_block(&mut self, output: &mut AudioBuffer, start_sample: usize, num_samples: usize);

    /// `true` while a note is assigned.
    fn is_voice_active(&self) -> bool {
        self.current_note().is_some()
    }

    /// Note currently assigned, if any.
    fn current_note(&self) -> Option<u8>;

    /// Return the voice to the pool.
    fn clear_current_note(&mut self);
}

/// Oscillator → amp envelope → filter → gain voice.
///
/// # Example
///
/// ```rust
/// use tapsynth_core::{AudioBuffer, ProcessSpec};
/// use tapsynth_synth::{Sound, SynthSound, SynthVoice, SynthesiserVoice, VoiceState};
///
/// let mut voice = SynthVoice::new();
/// voice.prepare_to_play(&ProcessSpec::new(48000.0, 256, 2));
///
/// let sound = Sound::from(SynthSound::new());
/// voice.start_note(60, 1.0, &sound, 8192);
/// assert_eq!(voice.state(), VoiceState::Sounding);
///
/// let mut out = AudioBuffer::new(2, 256);
/// voice.render_next_block(&mut out, 0, 256);
/// assert!(out.magnitude(0, 256) > 0.0);
///
/// voice.stop_note(0.0, false);
/// assert_eq!(voice.state(), VoiceState::Idle);
/// ```
#[derive(Debug, Clone)]
pub struct SynthVoice {
    oscillator: Oscillator,
    amp_envelope: AdsrEnvelope,
    filter_envelope: AdsrEnvelope,
    filter: ModulatedFilter,
    gain: Gain,
    scratch: AudioBuffer,
    params: VoiceParams,
    spec: ProcessSpec,
    prepared: bool,
    current_note: Option<u8>,
}

impl Default for SynthVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthVoice {
    /// Unprepared voice with default parameters.
    pub fn new() -> Self {
        let params = VoiceParams::default();
        let mut voice = Self {
            oscillator: Oscillator::default(),
            amp_envelope: AdsrEnvelope::default(),
            filter_envelope: AdsrEnvelope::default(),
            filter: ModulatedFilter::new(),
            gain: Gain::new(),
            scratch: AudioBuffer::default(),
            params,
            spec: ProcessSpec::default(),
            prepared: false,
            current_note: None,
        };
        voice.set_params(&params);
        voice
    }

    /// Apply a parameter snapshot. Filter settings take effect at the next
    /// block's filter update.
    pub fn set_params(&mut self, params: &VoiceParams) {
        self.oscillator.set_params(&params.osc1);
        self.amp_envelope.set_parameters(&params.amp_env);
        self.filter_envelope.set_parameters(&params.filter_env);
        self.gain.set_gain_linear(params.gain);
        self.params = *params;
    }

    /// Set the output gain ramp in seconds (0 steps immediately).
    pub fn set_gain_ramp(&mut self, seconds: f32) {
        self.gain.set_ramp_duration(seconds);
    }

    /// Last applied parameter snapshot.
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    /// Settings of the second oscillator, carried with the snapshot.
    pub fn osc2_params(&self) -> &OscParams {
        &self.params.osc2
    }

    /// Lifecycle state, derived from note assignment and the amplitude
    /// envelope.
    pub fn state(&self) -> VoiceState {
        if self.current_note.is_none() {
            return VoiceState::Idle;
        }
        match self.amp_envelope.state() {
            EnvelopeState::Idle => VoiceState::Idle,
            EnvelopeState::Release => VoiceState::Releasing,
            _ => VoiceState::Sounding,
        }
    }

    /// `true` once a valid session has been prepared.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Session this voice was prepared for.
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    /// The oscillator.
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// The amplitude envelope.
    pub fn amp_envelope(&self) -> &AdsrEnvelope {
        &self.amp_envelope
    }

    /// The filter-modulation envelope.
    pub fn filter_envelope(&self) -> &AdsrEnvelope {
        &self.filter_envelope
    }

    /// The filter stage.
    pub fn filter(&self) -> &ModulatedFilter {
        &self.filter
    }

    /// The output gain stage.
    pub fn gain(&self) -> &Gain {
        &self.gain
    }

    /// Pull the next filter-envelope sample and refresh the filter with it
    /// and the given base settings.
    pub fn update_filter(&mut self, filter_type: FilterType, cutoff: f32, resonance: f32) {
        let modulation = self.filter_envelope.get_next_sample();
        self.filter
            .update_parameters(modulation, filter_type, cutoff, resonance);
    }

    fn render_sub_block(
        &mut self,
        output: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
        channels: usize,
    ) {
        if !self.scratch.set_size(channels, num_samples) {
            return;
        }

        self.oscillator.render_block(&mut self.scratch);
        self.amp_envelope
            .apply_to_buffer(&mut self.scratch, 0, num_samples);

        let filter = self.params.filter;
        self.update_filter(filter.filter_type, filter.cutoff, filter.resonance);
        self.filter_envelope.advance_by(num_samples.saturating_sub(1));
        self.filter.process(&mut self.scratch);

        self.gain.process(&mut self.scratch);

        for ch in 0..channels {
            output.add_from(ch, start_sample, &self.scratch, ch, 0, num_samples, 1.0);
        }

        if !self.amp_envelope.is_active() {
            self.clear_current_note();
        }
    }
}

impl SynthesiserVoice for SynthVoice {
    fn can_play_sound(&self, sound: &Sound) -> bool {
        matches!(sound, Sound::Synth(_))
    }

    fn start_note(&mut self, note: u8, _velocity: f32, _sound: &Sound, _pitch_wheel: i32) {
        #[cfg(feature = "tracing")]
        tracing::debug!(note, "voice start");

        self.current_note = Some(note);
        self.oscillator.set_note(note);
        self.amp_envelope.note_on();
        self.filter_envelope.note_on();
    }

    fn stop_note(&mut self, _velocity: f32, allow_tail_off: bool) {
        if self.current_note.is_none() {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(note = self.current_note, allow_tail_off, "voice stop");

        self.amp_envelope.note_off();
        self.filter_envelope.note_off();

        if !allow_tail_off || !self.amp_envelope.is_active() {
            self.clear_current_note();
        }
    }

    fn controller_moved(&mut self, _controller: u8, _value: u8) {}

    fn pitch_wheel_moved(&mut self, _value: i32) {}

    fn prepare_to_play(&mut self, spec: &ProcessSpec) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = spec.sample_rate,
            block_size = spec.maximum_block_size,
            channels = spec.num_channels,
            "voice prepare"
        );

        self.spec = *spec;
        self.prepared = spec.sample_rate.is_finite()
            && spec.sample_rate > 0.0
            && spec.maximum_block_size > 0
            && spec.num_channels > 0;
        if !self.prepared {
            return;
        }

        self.oscillator.prepare(spec);
        self.amp_envelope.set_sample_rate(spec.sample_rate);
        self.filter_envelope.set_sample_rate(spec.sample_rate);
        self.filter.prepare(spec);
        self.gain.prepare(spec);
        self.gain.set_gain_linear(self.params.gain);
        self.scratch
            .allocate(spec.num_channels, spec.maximum_block_size);
    }

    fn render_next_block(&mut self, output: &mut AudioBuffer, start_sample: usize, num_samples: usize) {
        if !self.prepared || !self.is_voice_active() {
            return;
        }

        let end = start_sample
            .saturating_add(num_samples)
            .min(output.num_frames());
        let channels = output.num_channels().min(self.scratch.capacity_channels());
        let chunk = self.scratch.capacity_frames();

        let mut position = start_sample;
        while position < end && self.is_voice_active() {
            let len = (end - position).min(chunk);
            self.render_sub_block(output, position, len, channels);
            position += len;
        }
    }

    fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    fn clear_current_note(&mut self) {
        self.current_note = None;
    }
}
