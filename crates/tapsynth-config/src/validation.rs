//! Configuration validation.
//!
//! Voice parameters are checked against the ranges of the named parameter
//! store so a configuration that validates can be applied to
//! [`SharedParams`](tapsynth_synth::SharedParams) without clamping.
//!
//! # Example
//!
//! ```rust
//! use tapsynth_config::{EngineConfig, validate_config};
//!
//! let mut config = EngineConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.voice.gain = 4.0;
//! assert!(validate_config(&config).is_err());
//! ```

use thiserror::Error;

use tapsynth_synth::{AdsrParams, OscParams, ParamId, VoiceParams};

use crate::config::{EngineConfig, SessionConfig};

/// Largest supported voice pool.
pub const MAX_POLYPHONY: usize = 64;

/// Longest output gain ramp, in seconds.
pub const MAX_GAIN_RAMP: f32 = 1.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Session setting the engine cannot run with.
    #[error("invalid session setting '{field}': {reason}")]
    InvalidSession {
        /// Name of the session field.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check(errors: &mut Vec<ValidationError>, id: ParamId, value: f32) {
    let info = id.info();
    if !value.is_finite() || value < info.min || value > info.max {
        errors.push(ValidationError::OutOfRange {
            param: info.name.to_string(),
            value,
            min: info.min,
            max: info.max,
        });
    }
}

fn check_osc(errors: &mut Vec<ValidationError>, osc: &OscParams, freq: ParamId, depth: ParamId) {
    check(errors, freq, osc.fm_frequency);
    check(errors, depth, osc.fm_depth);
}

fn check_env(errors: &mut Vec<ValidationError>, env: &AdsrParams, ids: [ParamId; 4]) {
    let [attack, decay, sustain, release] = ids;
    check(errors, attack, env.attack);
    check(errors, decay, env.decay);
    check(errors, sustain, env.sustain);
    check(errors, release, env.release);
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn voice_errors(voice: &VoiceParams) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_osc(&mut errors, &voice.osc1, ParamId::Osc1FmFreq, ParamId::Osc1FmDepth);
    check_osc(&mut errors, &voice.osc2, ParamId::Osc2FmFreq, ParamId::Osc2FmDepth);
    check_env(
        &mut errors,
        &voice.amp_env,
        [ParamId::Attack, ParamId::Decay, ParamId::Sustain, ParamId::Release],
    );
    check_env(
        &mut errors,
        &voice.filter_env,
        [
            ParamId::FilterAttack,
            ParamId::FilterDecay,
            ParamId::FilterSustain,
            ParamId::FilterRelease,
        ],
    );
    check(&mut errors, ParamId::FilterFreq, voice.filter.cutoff);
    check(&mut errors, ParamId::FilterRes, voice.filter.resonance);
    check(&mut errors, ParamId::Gain, voice.gain);
    errors
}

fn session_errors(session: &SessionConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut invalid = |field: &str, reason: String| {
        errors.push(ValidationError::InvalidSession {
            field: field.to_string(),
            reason,
        });
    };

    if !(8000..=384_000).contains(&session.sample_rate) {
        invalid("sample_rate", "must be between 8000 and 384000 Hz".to_string());
    }
    if session.block_size == 0 {
        invalid("block_size", "must be greater than zero".to_string());
    }
    if session.channels == 0 {
        invalid("channels", "must be greater than zero".to_string());
    }
    if session.polyphony == 0 || session.polyphony > MAX_POLYPHONY {
        invalid("polyphony", format!("must be between 1 and {MAX_POLYPHONY}"));
    }
    if !(0.0..=MAX_GAIN_RAMP).contains(&session.gain_ramp) {
        invalid("gain_ramp", format!("must be between 0 and {MAX_GAIN_RAMP} seconds"));
    }
    errors
}

/// Check every voice parameter against its store range.
pub fn validate_voice(voice: &VoiceParams) -> ValidationResult<()> {
    collect(voice_errors(voice))
}

/// Check the session settings.
pub fn validate_session(session: &SessionConfig) -> ValidationResult<()> {
    collect(session_errors(session))
}

/// Check a whole configuration, reporting every problem at once.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = session_errors(&config.session);
    errors.extend(voice_errors(&config.voice));
    collect(errors)
}
