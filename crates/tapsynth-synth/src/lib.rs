//! Tapsynth Synth - the polyphonic synth voice
//!
//! This crate turns note-on/note-off events and a set of modulation
//! parameters into audio, block by block, without allocating or locking on
//! the render path.
//!
//! # Core Components
//!
//! ## Stages
//!
//! - [`Oscillator`] - Band-limited carrier with a built-in FM modulator
//! - [`AdsrEnvelope`] - Linear ADSR, used once for amplitude and once for
//!   filter modulation
//! - [`ModulatedFilter`] - Per-channel state-variable filter whose cutoff is
//!   scaled by the filter envelope once per block
//! - [`Gain`](tapsynth_core::Gain) - Output level (from `tapsynth-core`)
//!
//! ```rust
//! use tapsynth_synth::{AdsrEnvelope, AdsrParams, Oscillator, Waveform};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_waveform(Waveform::Saw);
//! osc.set_note(60);
//!
//! let mut env = AdsrEnvelope::new(48000.0);
//! env.set_parameters(&AdsrParams::new(0.005, 0.1, 0.7, 0.3));
//! env.note_on();
//!
//! let sample = osc.next_sample() * env.get_next_sample();
//! assert!(sample.is_finite());
//! ```
//!
//! ## Voices
//!
//! - [`SynthesiserVoice`] - Contract between a voice pool and its voices
//! - [`SynthVoice`] - Oscillator → amp envelope → filter → gain pipeline with
//!   note lifecycle
//! - [`Sound`] - Closed set of sounds a voice may be asked to play
//! - [`Synthesiser`] - Minimal fixed-size pool with sample-accurate
//!   [`MidiEvent`] handling
//!
//! ## Parameters
//!
//! - [`VoiceParams`] - Typed snapshot read once per block
//! - [`SharedParams`] - Lock-free named store (`"ATTACK"`, `"FILTERFREQ"`, ...)
//!   written by control threads
//!
//! # Features
//!
//! - `std` (default) - standard library support
//! - `serde` - `Serialize`/`Deserialize` for the parameter types
//! - `tracing` - debug events for voice lifecycle and preparation

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod params;
pub mod sound;
pub mod store;
pub mod synth;
pub mod voice;

pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use filter::ModulatedFilter;
pub use oscillator::Oscillator;
pub use params::{
    AdsrParams, DEFAULT_GAIN, FilterParams, FilterType, OscParams, VoiceParams, Waveform,
};
pub use sound::{NoteRange, SampledSound, Sound, SynthSound};
pub use store::{PARAMS, ParamError, ParamId, ParamInfo, SharedParams};
pub use synth::{MidiEvent, MidiMessage, PITCH_WHEEL_CENTRE, Synthesiser};
pub use voice::{SynthVoice, SynthesiserVoice, VoiceState};
