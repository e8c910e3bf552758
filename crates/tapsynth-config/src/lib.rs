//! Engine configuration for tapsynth.
//!
//! A TOML file holds the audio session (sample rate, block size, channels,
//! polyphony) and the initial voice parameters. Configurations are checked
//! against the named parameter store's ranges before use.
//!
//! # Example
//!
//! ```rust,no_run
//! use tapsynth_config::EngineConfig;
//! use tapsynth_synth::SharedParams;
//!
//! let config = EngineConfig::load_validated("tapsynth.toml").unwrap();
//! let params = SharedParams::from_voice_params(&config.voice);
//! let spec = config.process_spec();
//! ```

mod config;
mod error;

/// Configuration validation.
pub mod validation;

pub use config::{EngineConfig, SessionConfig};
pub use error::ConfigError;
pub use validation::{
    MAX_GAIN_RAMP, MAX_POLYPHONY, ValidationError, ValidationResult, validate_config,
    validate_session, validate_voice,
};
