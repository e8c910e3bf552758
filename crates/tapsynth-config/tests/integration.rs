//! Integration tests for tapsynth-config.
//!
//! These tests verify file round trips and that a loaded configuration
//! drives the synth end to end.

use std::sync::Arc;

use tapsynth_config::{ConfigError, EngineConfig, ValidationError};
use tapsynth_core::AudioBuffer;
use tapsynth_synth::{
    FilterType, MidiEvent, SharedParams, Sound, SynthSound, Synthesiser, Waveform,
};
use tempfile::TempDir;

/// Saving into a missing directory creates it, and loading returns the same
/// configuration.
#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("tapsynth.toml");

    let mut config = EngineConfig::default();
    config.session.polyphony = 12;
    config.session.gain_ramp = 0.005;
    config.voice.osc1.waveform = Waveform::Triangle;
    config.voice.osc2.fm_depth = 40.0;
    config.voice.filter.filter_type = FilterType::HighPass;
    config.voice.filter_env.sustain = 0.25;

    config.save(&path).expect("save should create parent directories");
    assert!(path.exists());

    let loaded = EngineConfig::load(&path).expect("load should succeed");
    assert_eq!(loaded, config);
}

/// Loading a missing file reports the path.
#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

/// Malformed TOML is a parse error, not a panic.
#[test]
fn test_load_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[session\nsample_rate = ").unwrap();

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { path: Some(_), .. }));
}

/// `load_validated` rejects out-of-range values that parse fine.
#[test]
fn test_load_validated_rejects_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loud.toml");
    std::fs::write(&path, "[voice]\ngain = 3.0\n").unwrap();

    assert!(EngineConfig::load(&path).is_ok());
    let err = EngineConfig::load_validated(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Validation(ValidationError::OutOfRange { .. })
    ));
}

/// A loaded configuration seeds the parameter store and renders audio.
#[test]
fn test_config_drives_synth() {
    let config = EngineConfig::from_toml(
        r#"
        [session]
        sample_rate = 44100
        block_size = 256
        channels = 2

        [voice]
        gain = 0.5

        [voice.osc1]
        waveform = "square"

        [voice.amp_env]
        attack = 0.0
        decay = 0.0
        sustain = 1.0
        release = 0.01

        [voice.filter]
        filter_type = "low-pass"
        cutoff = 5000.0
        resonance = 0.707
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    let params = Arc::new(SharedParams::from_voice_params(&config.voice));
    assert_eq!(params.get("OSC1WAVETYPE").unwrap(), 2.0);
    assert_eq!(params.get("GAIN").unwrap(), 0.5);

    let mut synth: Synthesiser<4> = Synthesiser::new(params);
    synth.add_sound(Sound::from(SynthSound::new()));
    synth.prepare_to_play(&config.process_spec());

    let mut out = AudioBuffer::new(2, 256);
    synth.render_next_block(&mut out, &[MidiEvent::note_on(0, 57, 1.0)], 0, 256);

    assert_eq!(synth.active_voice_count(), 1);
    assert!(out.magnitude(0, 256) > 0.1);
    assert!(out.channel(0).iter().all(|s| s.is_finite()));
}
