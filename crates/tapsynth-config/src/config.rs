//! Engine configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tapsynth_core::ProcessSpec;
use tapsynth_synth::VoiceParams;

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// Audio session settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Largest block the host will render at once.
    pub block_size: usize,
    /// Output channel count.
    pub channels: usize,
    /// Voices available to the pool.
    pub polyphony: usize,
    /// Seconds a voice takes to glide to a new output gain (0 steps).
    pub gain_ramp: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            channels: 2,
            polyphony: 8,
            gain_ramp: 0.0,
        }
    }
}

impl SessionConfig {
    /// Session as a [`ProcessSpec`] for every stage's `prepare`.
    pub fn process_spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.sample_rate as f32, self.block_size, self.channels)
    }
}

/// Complete engine configuration.
///
/// Missing sections and fields take their defaults.
///
/// # TOML Format
///
/// ```toml
/// [session]
/// sample_rate = 48000
/// block_size = 512
/// channels = 2
/// polyphony = 8
/// gain_ramp = 0.005
///
/// [voice]
/// gain = 0.3
///
/// [voice.osc1]
/// waveform = "saw"
/// fm_frequency = 0.0
/// fm_depth = 0.0
///
/// [voice.amp_env]
/// attack = 0.01
/// decay = 0.1
/// sustain = 1.0
/// release = 0.4
///
/// [voice.filter]
/// filter_type = "low-pass"
/// cutoff = 2000.0
/// resonance = 0.707
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Session settings.
    pub session: SessionConfig,
    /// Initial voice parameters.
    pub voice: VoiceParams,
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::parse(Some(path), e))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load and validate a configuration.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::parse(None, e))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write(path, e))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Check session settings and voice parameter ranges.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Session as a [`ProcessSpec`].
    pub fn process_spec(&self) -> ProcessSpec {
        self.session.process_spec()
    }
}
