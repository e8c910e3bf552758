//! Session description and the in-place stage contract.
//!
//! Every stage in the voice pipeline goes through the same two phases:
//!
//! 1. **Prepare** (off the audio thread, may allocate): the host hands over a
//!    [`ProcessSpec`] describing the session. Stages size their state and
//!    compute sample-rate dependent coefficients.
//! 2. **Process** (audio thread, must not allocate): the stage transforms an
//!    [`AudioBuffer`] in place, across all of its active channels.

use crate::AudioBuffer;

/// Session parameters fixed for the lifetime of a prepared session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will ask for in one render call.
    pub maximum_block_size: usize,
    /// Number of output channels.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Create a process spec.
    pub fn new(sample_rate: f32, maximum_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            maximum_block_size,
            num_channels,
        }
    }

    /// Nyquist frequency for this session.
    #[inline]
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(48000.0, 512, 2)
    }
}

/// In-place block processor.
///
/// Implementors must be realtime-safe in [`process`](Self::process): no heap
/// allocation, no locks, no I/O.
///
/// # Example
///
/// ```rust
/// use tapsynth_core::{AudioBuffer, ProcessSpec, Processor};
///
/// struct Invert;
///
/// impl Processor for Invert {
///     fn prepare(&mut self, _spec: &ProcessSpec) {}
///
///     fn process(&mut self, buffer: &mut AudioBuffer) {
///         for channel in buffer.channels_mut() {
///             for sample in channel.iter_mut() {
///                 *sample = -*sample;
///             }
///         }
///     }
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Processor {
    /// Configure the stage for a session. Called before any processing.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Process every active channel of `buffer` in place.
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Clear internal state (filter memory, ramps) without touching parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nyquist_is_half_sample_rate() {
        let spec = ProcessSpec::new(44100.0, 128, 2);
        assert_eq!(spec.nyquist(), 22050.0);
    }

    #[test]
    fn default_spec() {
        let spec = ProcessSpec::default();
        assert_eq!(spec.sample_rate, 48000.0);
        assert_eq!(spec.maximum_block_size, 512);
        assert_eq!(spec.num_channels, 2);
    }
}
