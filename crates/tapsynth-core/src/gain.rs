//! Output gain stage.
//!
//! Linear gain in `0.0..=1.0`, applied in place to every active channel.
//! The gain can be set directly or in dB; with a non-zero ramp time changes
//! glide linearly instead of stepping.

use crate::{AudioBuffer, ProcessSpec, Processor, RampedParam, db_to_linear, linear_to_db};

/// Lowest linear gain.
pub const MIN_GAIN: f32 = 0.0;

/// Highest linear gain (unity).
pub const MAX_GAIN: f32 = 1.0;

/// Linear gain stage.
///
/// ## Parameters
///
/// - `gain`: linear, clamped to 0.0..=1.0 (default 1.0)
/// - `ramp`: seconds for a gain change to complete (default 0, immediate)
#[derive(Debug, Clone)]
pub struct Gain {
    gain: RampedParam,
    ramp_seconds: f32,
    sample_rate: f32,
}

impl Default for Gain {
    fn default() -> Self {
        Self::new()
    }
}

impl Gain {
    /// Unity gain with no ramp.
    pub fn new() -> Self {
        Self {
            gain: RampedParam::new(MAX_GAIN),
            ramp_seconds: 0.0,
            sample_rate: 48000.0,
        }
    }

    /// Set the linear gain (clamped to 0.0..=1.0; NaN is ignored).
    pub fn set_gain_linear(&mut self, gain: f32) {
        if gain.is_nan() {
            return;
        }
        self.gain.set_target(gain.clamp(MIN_GAIN, MAX_GAIN));
    }

    /// Set the gain in decibels. Anything at or above 0 dB is unity.
    pub fn set_gain_db(&mut self, db: f32) {
        self.set_gain_linear(db_to_linear(db));
    }

    /// Target linear gain.
    pub fn gain_linear(&self) -> f32 {
        self.gain.target()
    }

    /// Target gain in decibels.
    pub fn gain_db(&self) -> f32 {
        linear_to_db(self.gain.target())
    }

    /// Set how long a gain change takes. Takes effect immediately and ends
    /// any ramp in progress.
    pub fn set_ramp_duration(&mut self, seconds: f32) {
        self.ramp_seconds = seconds.max(0.0);
        self.gain.reset(self.sample_rate, self.ramp_seconds);
    }

    /// `true` while a gain change is still gliding.
    pub fn is_ramping(&self) -> bool {
        !self.gain.is_settled()
    }
}

impl Processor for Gain {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.gain.reset(self.sample_rate, self.ramp_seconds);
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        if self.gain.is_settled() {
            buffer.apply_gain(self.gain.get());
            return;
        }
        for i in 0..buffer.num_frames() {
            let g = self.gain.advance();
            buffer.scale_frame(i, g);
        }
    }

    fn reset(&mut self) {
        self.gain.snap_to_target();
    }
}
