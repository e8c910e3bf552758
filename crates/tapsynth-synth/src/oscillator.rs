//! Audio-rate oscillator with frequency modulation.
//!
//! A band-limited carrier (PolyBLEP for the discontinuous waveforms) whose
//! instantaneous frequency is `base + fm_depth × modulator(fm_frequency)`.
//! The modulator is a sine with its own phase accumulator. Both phases run
//! continuously across blocks and across notes.

use core::f32::consts::PI;
use libm::{fabsf, floorf, sinf};
use tapsynth_core::{AudioBuffer, ProcessSpec, math::midi_note_to_hz};

use crate::params::{OscParams, Waveform};

/// Wrap a phase into [0.0, 1.0).
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let r = phase - floorf(phase);
    if r >= 1.0 { 0.0 } else { r }
}

/// Sine modulator with an independent phase.
#[derive(Debug, Clone, Default)]
struct Modulator {
    phase: f32,
}

impl Modulator {
    #[inline]
    fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = sinf(2.0 * PI * self.phase);
        self.phase = wrap_phase(self.phase + frequency / sample_rate);
        out
    }
}

/// Carrier oscillator with a built-in FM modulator.
///
/// # Example
///
/// ```rust
/// use tapsynth_synth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_waveform(Waveform::Saw);
/// osc.set_note(69);
/// assert!((osc.frequency() - 440.0).abs() < 1e-3);
///
/// let sample = osc.next_sample();
/// assert!(sample.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Carrier phase [0.0, 1.0)
    phase: f32,
    sample_rate: f32,
    /// Pitch before modulation
    base_frequency: f32,
    waveform: Waveform,
    fm_frequency: f32,
    fm_depth: f32,
    modulator: Modulator,
    noise_state: u32,
    /// Leaky integrator state for the triangle
    integrator: f32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Sine at 440 Hz with FM off.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
            base_frequency: 440.0,
            waveform: Waveform::Sine,
            fm_frequency: 0.0,
            fm_depth: 0.0,
            modulator: Modulator::default(),
            noise_state: 0x12345678,
            integrator: 0.0,
        }
    }

    /// Adopt the session sample rate.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        if spec.sample_rate > 0.0 {
            self.sample_rate = spec.sample_rate;
        }
    }

    /// Set the pitch from a MIDI note (equal temperament, A4 = 440 Hz).
    pub fn set_note(&mut self, note: u8) {
        self.base_frequency = midi_note_to_hz(note);
    }

    /// Set the pitch in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.base_frequency = if freq_hz.is_finite() {
            freq_hz.max(0.0)
        } else {
            0.0
        };
    }

    /// Pitch before modulation, in Hz.
    pub fn frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Select the carrier waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Current carrier waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set modulator frequency and depth, both in Hz. Negative or
    /// non-finite values are treated as zero.
    pub fn set_fm(&mut self, fm_frequency: f32, fm_depth: f32) {
        let sanitize = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.fm_frequency = sanitize(fm_frequency);
        self.fm_depth = sanitize(fm_depth);
    }

    /// Modulator frequency in Hz.
    pub fn fm_frequency(&self) -> f32 {
        self.fm_frequency
    }

    /// Modulation depth in Hz.
    pub fn fm_depth(&self) -> f32 {
        self.fm_depth
    }

    /// Apply waveform and FM settings.
    pub fn set_params(&mut self, params: &OscParams) {
        self.set_waveform(params.waveform);
        self.set_fm(params.fm_frequency, params.fm_depth);
    }

    /// Carrier phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset both phases and the triangle integrator.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.modulator.phase = 0.0;
        self.integrator = 0.0;
    }

    /// Generate one sample and advance both phases.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let modulation = self.fm_depth
            * self
                .modulator
                .next_sample(self.fm_frequency, self.sample_rate);
        let nyquist = self.sample_rate * 0.5;
        let frequency = (self.base_frequency + modulation).clamp(-nyquist, nyquist);
        let increment = frequency / self.sample_rate;

        let out = self.generate(self.phase, fabsf(increment));
        self.phase = wrap_phase(self.phase + increment);
        out
    }

    /// Fill every active channel of `buffer` with the next
    /// `buffer.num_frames()` samples. Overwrites, never mixes.
    pub fn render_block(&mut self, buffer: &mut AudioBuffer) {
        let channels = buffer.num_channels();
        for i in 0..buffer.num_frames() {
            let sample = self.next_sample();
            for ch in 0..channels {
                buffer.set_sample(ch, i, sample);
            }
        }
    }

    #[inline]
    fn generate(&mut self, phase: f32, dt: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => sinf(phase * 2.0 * PI),

            Waveform::Saw => 2.0 * phase - 1.0 - poly_blep(phase, dt),

            Waveform::Square => square(phase, dt),

            Waveform::Triangle => {
                // Leaky integration of a band-limited square; the leak keeps
                // the DC offset from accumulating.
                let leak = 1.0 - dt.min(0.1);
                self.integrator = leak * self.integrator + square(phase, dt) * dt * 4.0;
                self.integrator
            }

            Waveform::Noise => {
                let mut x = self.noise_state;
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                self.noise_state = x;
                (x as i32 as f32) / (i32::MAX as f32)
            }
        }
    }
}

#[inline]
fn square(phase: f32, dt: f32) -> f32 {
    let naive = if phase < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(phase, dt) - poly_blep(wrap_phase(phase + 0.5), dt)
}

/// 2nd-order PolyBLEP residual around a unit step at phase 0.
///
/// Reference: Välimäki et al., "Antialiasing Oscillators", IEEE Signal
/// Processing Magazine, 2010.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let n = t / dt;
        2.0 * n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + 2.0 * n + 1.0
    } else {
        0.0
    }
}
