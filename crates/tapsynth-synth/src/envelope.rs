//! Linear ADSR envelope generator.
//!
//! Segments are straight lines: attack rises 0 → 1 over `attack` seconds,
//! decay falls 1 → `sustain` over `decay` seconds, sustain holds, and release
//! falls from wherever the envelope was at note-off to 0 over `release`
//! seconds. Each segment lasts a whole number of samples and its last sample
//! lands exactly on the target; a zero-length segment completes on the next
//! sample.

use tapsynth_core::{AudioBuffer, math::seconds_to_samples};

use crate::params::AdsrParams;

/// Envelope stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Inactive, output is zero.
    #[default]
    Idle,
    /// Rising toward 1.0.
    Attack,
    /// Falling toward the sustain level.
    Decay,
    /// Holding the sustain level.
    Sustain,
    /// Falling toward zero after note-off.
    Release,
}

/// ADSR envelope with per-sample stepping.
///
/// # Example
///
/// ```rust
/// use tapsynth_synth::{AdsrEnvelope, AdsrParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_parameters(&AdsrParams::new(0.01, 0.1, 0.7, 0.2));
///
/// env.note_on();
/// assert_eq!(env.state(), EnvelopeState::Attack);
/// for _ in 0..480 {
///     env.get_next_sample();
/// }
/// assert_eq!(env.level(), 1.0);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,
    params: AdsrParams,
    /// Level change per sample in the current segment
    step: f32,
    /// Samples left in the current segment; the last one lands on the target
    remaining: usize,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Idle envelope with [`AdsrParams::default`] settings.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            params: AdsrParams::default(),
            step: 0.0,
            remaining: 0,
        }
    }

    /// Set the sample rate used for segments started from now on.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 && sample_rate.is_finite() {
            self.sample_rate = sample_rate;
        }
    }

    /// Replace the envelope settings.
    ///
    /// Times are clamped to be non-negative and the sustain level to
    /// 0.0..=1.0. New times apply from the next segment; a new sustain level
    /// applies immediately.
    pub fn set_parameters(&mut self, params: &AdsrParams) {
        let sanitize = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.params = AdsrParams {
            attack: sanitize(params.attack),
            decay: sanitize(params.decay),
            sustain: sanitize(params.sustain).min(1.0),
            release: sanitize(params.release),
        };
    }

    /// Current settings.
    pub fn parameters(&self) -> &AdsrParams {
        &self.params
    }

    fn enter(&mut self, state: EnvelopeState, target: f32, seconds: f32) {
        self.state = state;
        self.remaining = seconds_to_samples(seconds, self.sample_rate);
        self.step = if self.remaining > 0 {
            (self.level - target).abs() / self.remaining as f32
        } else {
            0.0
        };
    }

    /// Start the attack from zero, whatever the current stage.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.enter(EnvelopeState::Attack, 1.0, self.params.attack);
    }

    /// Enter release from the current level. Ignored when idle.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        self.enter(EnvelopeState::Release, 0.0, self.params.release);
    }

    /// Force the envelope idle at zero.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Last value returned by [`get_next_sample`](Self::get_next_sample).
    pub fn level(&self) -> f32 {
        self.level
    }

    /// `false` only when idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return the new level in 0.0..=1.0.
    #[inline]
    pub fn get_next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {}

            EnvelopeState::Attack => {
                if self.remaining > 1 {
                    self.level += self.step;
                    self.remaining -= 1;
                } else {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay, self.params.sustain, self.params.decay);
                }
            }

            EnvelopeState::Decay => {
                if self.remaining > 1 {
                    self.level = (self.level - self.step).max(self.params.sustain);
                    self.remaining -= 1;
                } else {
                    self.level = self.params.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => self.level = self.params.sustain,

            EnvelopeState::Release => {
                if self.remaining > 1 {
                    self.level = (self.level - self.step).max(0.0);
                    self.remaining -= 1;
                } else {
                    self.reset();
                }
            }
        }
        self.level
    }

    /// Advance `num_samples` samples without producing output and return the
    /// level reached. Stops stepping early once the envelope sits in sustain
    /// or idle, where further steps change nothing.
    pub fn advance_by(&mut self, num_samples: usize) -> f32 {
        for _ in 0..num_samples {
            match self.state {
                EnvelopeState::Idle => break,
                EnvelopeState::Sustain => {
                    self.level = self.params.sustain;
                    break;
                }
                _ => {
                    self.get_next_sample();
                }
            }
        }
        self.level
    }

    /// Multiply `num_samples` frames of `buffer` from `start_sample`, on every
    /// active channel, by successive envelope values.
    pub fn apply_to_buffer(
        &mut self,
        buffer: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    ) {
        for i in start_sample..start_sample + num_samples {
            let gain = self.get_next_sample();
            buffer.scale_frame(i, gain);
        }
    }
}
