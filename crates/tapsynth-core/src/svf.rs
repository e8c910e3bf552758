//! State Variable Filter.
//!
//! Two-pole (12 dB/oct) filter that produces lowpass, highpass, bandpass and
//! notch responses from the same state. Stays well behaved while the cutoff
//! is being swept, which is what the envelope-driven filter stage needs.
//!
//! # Topology
//!
//! Topology-Preserving Transform (TPT) SVF after Zavalishin, "The Art of VA
//! Filter Design" (2012). Trapezoidal integrators keep the analog
//! prototype's response up to Nyquist.
//!
//! # Stability
//!
//! The prewarp term `tan(π·fc/fs)` diverges at Nyquist, so the cutoff is
//! always clamped to [`MIN_CUTOFF_HZ`]..=`sample_rate × MAX_CUTOFF_RATIO`
//! before coefficients are computed. Resonance is clamped to
//! [`MIN_RESONANCE`]..=[`MAX_RESONANCE`] so the damping term never reaches
//! zero.

use core::f32::consts::PI;
use libm::tanf;

use crate::flush_denormal;

/// Lowest cutoff accepted by [`StateVariableFilter::set_cutoff`].
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Highest cutoff as a fraction of the sample rate (just under Nyquist).
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Lowest resonance (Q) accepted.
pub const MIN_RESONANCE: f32 = 0.1;

/// Highest resonance (Q) accepted.
pub const MAX_RESONANCE: f32 = 20.0;

/// State Variable Filter response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfOutput {
    /// Passes frequencies below the cutoff.
    #[default]
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
    /// Passes frequencies near the cutoff.
    Bandpass,
    /// Rejects frequencies near the cutoff.
    Notch,
}

/// TPT State Variable Filter (2-pole, 12 dB/oct).
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to 20.0..=sr×0.49 (default 1000.0)
/// - `resonance`: Q factor, clamped to 0.1..=20.0 (default 0.707)
/// - `output`: response type (default `Lowpass`)
///
/// # Example
///
/// ```rust
/// use tapsynth_core::{StateVariableFilter, SvfOutput};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_cutoff(1000.0);
/// svf.set_resonance(2.0);
/// svf.set_output(SvfOutput::Bandpass);
///
/// let y = svf.process(0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    ic1eq: f32,
    ic2eq: f32,

    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    output: SvfOutput,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Create a lowpass SVF at 1 kHz with a Butterworth Q.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: core::f32::consts::FRAC_1_SQRT_2,
            output: SvfOutput::Lowpass,
        };
        svf.update_coefficients();
        svf
    }

    /// Change the sample rate; the cutoff is re-clamped to the new range.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff);
    }

    /// Set cutoff in Hz. Non-finite values fall back to the lowest cutoff.
    pub fn set_cutoff(&mut self, freq: f32) {
        let freq = if freq.is_finite() { freq } else { MIN_CUTOFF_HZ };
        self.cutoff = freq.clamp(MIN_CUTOFF_HZ, self.max_cutoff());
        self.update_coefficients();
    }

    /// Current (clamped) cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Highest cutoff the current sample rate allows.
    #[inline]
    pub fn max_cutoff(&self) -> f32 {
        (self.sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ)
    }

    /// Set resonance (Q). Non-finite values fall back to Butterworth.
    pub fn set_resonance(&mut self, q: f32) {
        let q = if q.is_finite() {
            q
        } else {
            core::f32::consts::FRAC_1_SQRT_2
        };
        self.resonance = q.clamp(MIN_RESONANCE, MAX_RESONANCE);
        self.update_coefficients();
    }

    /// Current (clamped) resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Select the response type.
    pub fn set_output(&mut self, output: SvfOutput) {
        self.output = output;
    }

    /// Current response type.
    pub fn output(&self) -> SvfOutput {
        self.output
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.k = 1.0 / self.resonance;
    }

    /// Run one sample and return `(lowpass, highpass, bandpass, notch)`.
    #[inline]
    pub fn process_all(&mut self, input: f32) -> (f32, f32, f32, f32) {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        let hp = input - self.k * v1 - v2;
        (v2, hp, v1, v2 + hp)
    }

    /// Run one sample through the selected response.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let (lp, hp, bp, notch) = self.process_all(input);
        match self.output {
            SvfOutput::Lowpass => lp,
            SvfOutput::Highpass => hp,
            SvfOutput::Bandpass => bp,
            SvfOutput::Notch => notch,
        }
    }

    /// Filter a slice in place.
    pub fn process_slice(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the integrator state.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
