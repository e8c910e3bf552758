//! Lock-free parameter cell.
//!
//! Control threads (UI, automation, config loading) write, the audio thread
//! reads. The f32 is bit-cast into an `AtomicU32`, so both sides are a single
//! atomic load or store: no locks, no allocation.

use core::sync::atomic::{AtomicU32, Ordering};

/// A thread-safe f32 with a fixed range and default.
///
/// # Example
///
/// ```rust
/// use tapsynth_core::AtomicParam;
///
/// let cutoff = AtomicParam::new(2000.0, 20.0, 20000.0);
/// cutoff.set(1.0e6);
/// assert_eq!(cutoff.get(), 20000.0);
/// cutoff.reset();
/// assert_eq!(cutoff.get(), 2000.0);
/// ```
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a cell holding `default`, accepting values in `min..=max`.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self {
            value: AtomicU32::new(default.clamp(min, max).to_bits()),
            min,
            max,
            default,
        }
    }

    /// Store `v` clamped to the range. Non-finite values are ignored.
    #[inline]
    pub fn set(&self, v: f32) {
        if !v.is_finite() {
            return;
        }
        let clamped = v.clamp(self.min, self.max);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Load the current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Lower bound.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Default value.
    pub fn default_value(&self) -> f32 {
        self.default
    }

    /// Store the default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

impl Clone for AtomicParam {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU32::new(self.value.load(Ordering::Acquire)),
            min: self.min,
            max: self.max,
            default: self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_to_range() {
        let p = AtomicParam::new(0.5, 0.0, 1.0);
        p.set(2.0);
        assert_eq!(p.get(), 1.0);
        p.set(-2.0);
        assert_eq!(p.get(), 0.0);
    }

    #[test]
    fn non_finite_writes_are_dropped() {
        let p = AtomicParam::new(0.5, 0.0, 1.0);
        p.set(f32::NAN);
        p.set(f32::INFINITY);
        assert_eq!(p.get(), 0.5);
    }

    #[test]
    fn clone_copies_current_value() {
        let p = AtomicParam::new(0.5, 0.0, 1.0);
        p.set(0.25);
        let q = p.clone();
        p.set(0.75);
        assert_eq!(q.get(), 0.25);
        assert_eq!(q.default_value(), 0.5);
    }

    #[cfg(feature = "std")]
    #[test]
    fn visible_across_threads() {
        use std::sync::Arc;

        let p = Arc::new(AtomicParam::new(0.0, 0.0, 10.0));
        let writer = Arc::clone(&p);
        std::thread::spawn(move || writer.set(7.5))
            .join()
            .expect("writer thread panicked");
        assert_eq!(p.get(), 7.5);
    }
}
