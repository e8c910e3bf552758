//! Linearly ramped parameter.
//!
//! Moves toward its target at a constant rate so a change lands in a
//! predictable number of samples. A ramp length of zero makes every target
//! change take effect immediately.

/// A value that ramps linearly toward a target over a fixed duration.
///
/// # Example
///
/// ```rust
/// use tapsynth_core::RampedParam;
///
/// let mut gain = RampedParam::new(0.0);
/// gain.reset(4.0, 1.0); // 4 samples
/// gain.set_target(1.0);
///
/// assert_eq!(gain.advance(), 0.25);
/// assert_eq!(gain.advance(), 0.5);
/// gain.advance();
/// assert_eq!(gain.advance(), 1.0);
/// assert!(gain.is_settled());
/// ```
#[derive(Debug, Clone)]
pub struct RampedParam {
    current: f32,
    target: f32,
    /// Per-sample increment (sign follows the ramp direction)
    increment: f32,
    samples_remaining: u32,
    ramp_samples: u32,
}

impl RampedParam {
    /// Create a settled parameter with no ramp.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            ramp_samples: 0,
        }
    }

    /// Set the ramp length from a sample rate and a duration in seconds, and
    /// snap to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        let samples = sample_rate * ramp_seconds;
        self.ramp_samples = if samples.is_finite() && samples > 0.0 {
            samples as u32
        } else {
            0
        };
        self.snap_to_target();
    }

    /// Start ramping toward `target`.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;

        if self.ramp_samples == 0 {
            self.snap_to_target();
        } else {
            self.increment = (target - self.current) / self.ramp_samples as f32;
            self.samples_remaining = self.ramp_samples;
        }
    }

    /// Step one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.samples_remaining -= 1;
            self.current = if self.samples_remaining == 0 {
                self.target
            } else {
                self.current + self.increment
            };
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Value being ramped toward.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// `true` when no ramp is in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }

    /// End any ramp at the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }
}

impl Default for RampedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ramp_is_immediate() {
        let mut p = RampedParam::new(0.0);
        p.set_target(0.7);
        assert_eq!(p.get(), 0.7);
        assert!(p.is_settled());
    }

    #[test]
    fn ramp_reaches_target_exactly() {
        let mut p = RampedParam::new(1.0);
        p.reset(48000.0, 0.01);
        p.set_target(0.0);

        let mut last = 1.0;
        for _ in 0..480 {
            let v = p.advance();
            assert!(v <= last);
            last = v;
        }
        assert_eq!(p.get(), 0.0);
        assert!(p.is_settled());
    }

    #[test]
    fn reset_snaps_pending_ramp() {
        let mut p = RampedParam::new(0.0);
        p.reset(1000.0, 1.0);
        p.set_target(1.0);
        p.advance();
        p.reset(1000.0, 1.0);
        assert_eq!(p.get(), 1.0);
    }
}
