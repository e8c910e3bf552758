//! Tapsynth Core - realtime-safe DSP primitives
//!
//! This crate provides the building blocks shared by the tapsynth voice
//! pipeline. Everything here is designed for the audio thread: after
//! `prepare`, no method allocates, blocks, or takes a lock.
//!
//! # Core Abstractions
//!
//! ## Session Setup
//!
//! - [`ProcessSpec`] - Sample rate, maximum block size and channel count,
//!   handed to every stage before rendering begins
//! - [`Processor`] - In-place block processing contract for stages
//!
//! ## Buffers
//!
//! - [`AudioBuffer`] - Multichannel buffer with a fixed capacity; resizing
//!   within capacity never allocates
//!
//! ## Stages
//!
//! - [`StateVariableFilter`] - TPT state-variable filter (lowpass, highpass,
//!   bandpass, notch)
//! - [`Gain`] - Linear gain with optional ramping
//!
//! ## Parameters
//!
//! - [`RampedParam`] - Linear ramp toward a target value
//! - [`AtomicParam`] - Lock-free f32 cell for cross-thread parameter exchange
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! tapsynth-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tapsynth_core::{AudioBuffer, Gain, ProcessSpec, Processor};
//!
//! let spec = ProcessSpec::new(48000.0, 256, 2);
//! let mut buffer = AudioBuffer::new(2, 256);
//! buffer.channel_mut(0).fill(1.0);
//!
//! let mut gain = Gain::new();
//! gain.prepare(&spec);
//! gain.set_gain_linear(0.5);
//! gain.process(&mut buffer);
//!
//! assert_eq!(buffer.channel(0)[0], 0.5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod atomic;
pub mod buffer;
pub mod gain;
pub mod math;
pub mod param;
pub mod processor;
pub mod svf;

pub use atomic::AtomicParam;
pub use buffer::AudioBuffer;
pub use gain::Gain;
pub use math::{db_to_linear, flush_denormal, linear_to_db};
pub use param::RampedParam;
pub use processor::{ProcessSpec, Processor};
pub use svf::{StateVariableFilter, SvfOutput};
