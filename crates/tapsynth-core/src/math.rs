//! Level conversions and numeric helpers for the audio path.
//!
//! All functions are allocation-free and `no_std`.

use libm::{expf, logf, powf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use tapsynth_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs at or below zero map to -200 dB.
///
/// # Example
/// ```rust
/// use tapsynth_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) + 6.02).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Flush values in the subnormal range to zero.
///
/// Recursive filter state decaying toward zero otherwise spends a long time
/// in denormals, which are very slow on x86.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Equal-temperament frequency of a MIDI note (A4 = note 69 = 440 Hz).
///
/// # Example
/// ```rust
/// use tapsynth_core::math::midi_note_to_hz;
///
/// assert!((midi_note_to_hz(69) - 440.0).abs() < 1e-3);
/// assert!((midi_note_to_hz(81) - 880.0).abs() < 1e-2);
/// ```
#[inline]
pub fn midi_note_to_hz(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert a duration in seconds to a whole number of samples (rounded).
/// Negative or non-finite durations give zero.
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    let samples = seconds * sample_rate;
    if samples.is_finite() && samples > 0.0 {
        (samples + 0.5) as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip_at_common_levels() {
        for db in [-24.0, -6.0, 0.0, 6.0] {
            assert!((linear_to_db(db_to_linear(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn silence_has_finite_db() {
        assert!(linear_to_db(0.0).is_finite());
        assert!(linear_to_db(-1.0) < -150.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-30), 0.0);
    }

    #[test]
    fn octaves_double_frequency() {
        assert!((midi_note_to_hz(57) - 220.0).abs() < 1e-3);
        assert!((midi_note_to_hz(60) - 261.6256).abs() < 1e-2);
        for note in 0..=115u8 {
            let ratio = midi_note_to_hz(note + 12) / midi_note_to_hz(note);
            assert!((ratio - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn seconds_to_samples_rounds_and_clamps() {
        assert_eq!(seconds_to_samples(0.5, 48000.0), 24000);
        assert_eq!(seconds_to_samples(0.0, 48000.0), 0);
        assert_eq!(seconds_to_samples(-1.0, 48000.0), 0);
        assert_eq!(seconds_to_samples(f32::NAN, 48000.0), 0);
    }
}
