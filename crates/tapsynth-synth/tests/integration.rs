//! Integration tests for tapsynth-synth.
//!
//! Tests cover voice lifecycle, envelope shape, block rendering order,
//! additive mixing, the parameter store and the voice pool.

use std::sync::Arc;

use tapsynth_core::math::midi_note_to_hz;
use tapsynth_core::{AudioBuffer, ProcessSpec};
use tapsynth_synth::{
    AdsrEnvelope, AdsrParams, EnvelopeState, FilterType, MidiEvent, MidiMessage, ModulatedFilter,
    ParamError, SharedParams, Sound, SynthSound, SynthVoice, Synthesiser, SynthesiserVoice,
    VoiceParams, VoiceState, Waveform,
};

const SR: f32 = 48000.0;
const CENTRE: i32 = 8192;

fn sound() -> Sound {
    Sound::from(SynthSound::new())
}

fn voice_with(params: &VoiceParams, block: usize) -> SynthVoice {
    let mut voice = SynthVoice::new();
    voice.set_params(params);
    voice.prepare_to_play(&ProcessSpec::new(SR, block, 2));
    voice
}

// ---------------------------------------------------------------------------
// 1. Note lifecycle
// ---------------------------------------------------------------------------

#[test]
fn start_note_uses_equal_temperament() {
    let mut voice = voice_with(&VoiceParams::default(), 128);

    for note in [21u8, 60, 69, 108] {
        voice.start_note(note, 1.0, &sound(), CENTRE);
        let expected = 440.0 * 2.0f32.powf((f32::from(note) - 69.0) / 12.0);
        let actual = voice.oscillator().frequency();
        assert!(
            (actual - expected).abs() / expected < 1e-4,
            "note {note}: {actual} vs {expected}"
        );
        assert!((midi_note_to_hz(note) - expected).abs() / expected < 1e-4);
        assert_eq!(voice.amp_envelope().state(), EnvelopeState::Attack);
        assert_eq!(voice.filter_envelope().state(), EnvelopeState::Attack);
    }
}

#[test]
fn retrigger_restarts_attack_from_zero() {
    let mut voice = voice_with(&VoiceParams::default(), 256);
    voice.start_note(60, 1.0, &sound(), CENTRE);

    let mut out = AudioBuffer::new(2, 256);
    voice.render_next_block(&mut out, 0, 256);
    assert!(voice.amp_envelope().level() > 0.0);

    voice.start_note(62, 1.0, &sound(), CENTRE);
    assert_eq!(voice.current_note(), Some(62));
    assert_eq!(voice.amp_envelope().state(), EnvelopeState::Attack);
    assert_eq!(voice.amp_envelope().level(), 0.0);
}

#[test]
fn stop_without_tail_is_idempotent() {
    let mut voice = voice_with(&VoiceParams::default(), 64);
    voice.start_note(60, 1.0, &sound(), CENTRE);

    voice.stop_note(0.0, false);
    let after_first = (voice.state(), voice.current_note());
    voice.stop_note(0.0, false);
    voice.stop_note(0.0, true);

    assert_eq!(after_first, (VoiceState::Idle, None));
    assert_eq!((voice.state(), voice.current_note()), after_first);
}

#[test]
fn tail_off_returns_voice_only_after_release() {
    let mut params = VoiceParams::default();
    params.amp_env = AdsrParams::new(0.0, 0.0, 0.8, 0.05);
    let mut voice = voice_with(&params, 100);

    voice.start_note(64, 1.0, &sound(), CENTRE);
    let mut out = AudioBuffer::new(2, 100);
    voice.render_next_block(&mut out, 0, 100);
    voice.stop_note(0.0, true);

    // 50 ms = 2400 samples = 24 blocks of 100.
    let mut blocks = 0;
    while voice.is_voice_active() {
        assert_eq!(voice.state(), VoiceState::Releasing);
        out.clear();
        voice.render_next_block(&mut out, 0, 100);
        blocks += 1;
        assert!(blocks <= 24, "release ran past its length");
    }
    assert_eq!(blocks, 24);
    assert_eq!(voice.amp_envelope().state(), EnvelopeState::Idle);
}

#[test]
fn unprepared_voice_never_writes() {
    let mut voice = SynthVoice::new();
    voice.start_note(60, 1.0, &sound(), CENTRE);

    let mut out = AudioBuffer::new(1, 64);
    out.channel_mut(0).fill(-0.25);
    voice.render_next_block(&mut out, 0, 64);

    assert!(out.channel(0).iter().all(|&s| s == -0.25));
    assert_eq!(voice.current_note(), Some(60));
}

// ---------------------------------------------------------------------------
// 2. Envelope shape
// ---------------------------------------------------------------------------

#[test]
fn envelope_rises_then_falls_to_sustain() {
    let mut env = AdsrEnvelope::new(SR);
    env.set_parameters(&AdsrParams::new(0.01, 0.02, 0.4, 0.1));
    env.note_on();

    let attack = (0.01 * SR) as usize;
    let decay = (0.02 * SR) as usize;

    let mut prev = 0.0;
    for _ in 0..attack {
        let level = env.get_next_sample();
        assert!(level >= prev, "attack must not decrease");
        prev = level;
    }
    assert!((prev - 1.0).abs() < 1e-6);

    for _ in 0..decay {
        let level = env.get_next_sample();
        assert!(level <= prev, "decay must not increase");
        prev = level;
    }
    assert_eq!(env.state(), EnvelopeState::Sustain);
    assert!((prev - 0.4).abs() < 1e-6);

    env.note_off();
    while env.is_active() {
        let level = env.get_next_sample();
        assert!(level <= prev, "release must not increase");
        prev = level;
    }
    assert_eq!(env.level(), 0.0);
}

#[test]
fn degenerate_envelope_renders_finite_audio() {
    let mut params = VoiceParams::default();
    params.amp_env = AdsrParams::new(0.0, 0.0, 1.0, 0.0);
    params.filter_env = AdsrParams::new(0.0, 0.0, 1.0, 0.0);
    let mut voice = voice_with(&params, 64);

    voice.start_note(60, 1.0, &sound(), CENTRE);
    let mut out = AudioBuffer::new(2, 64);
    voice.render_next_block(&mut out, 0, 64);

    assert!(out.channel(0).iter().all(|s| s.is_finite()));
    assert!(out.magnitude(0, 64) > 0.0);

    voice.stop_note(0.0, true);
    voice.render_next_block(&mut out, 0, 64);
    assert!(!voice.is_voice_active());
}

// ---------------------------------------------------------------------------
// 3. Block rendering
// ---------------------------------------------------------------------------

#[test]
fn two_voices_sum_linearly() {
    let mut params = VoiceParams::default();
    params.osc1.waveform = Waveform::Saw;
    let mut a = voice_with(&params, 128);
    let mut b = voice_with(&params, 128);
    let mut a_solo = voice_with(&params, 128);
    let mut b_solo = voice_with(&params, 128);

    a.start_note(60, 1.0, &sound(), CENTRE);
    a_solo.start_note(60, 1.0, &sound(), CENTRE);
    b.start_note(67, 1.0, &sound(), CENTRE);
    b_solo.start_note(67, 1.0, &sound(), CENTRE);

    let mut mixed = AudioBuffer::new(2, 128);
    a.render_next_block(&mut mixed, 0, 128);
    b.render_next_block(&mut mixed, 0, 128);

    let mut only_a = AudioBuffer::new(2, 128);
    let mut only_b = AudioBuffer::new(2, 128);
    a_solo.render_next_block(&mut only_a, 0, 128);
    b_solo.render_next_block(&mut only_b, 0, 128);

    for ch in 0..2 {
        for i in 0..128 {
            let expected = only_a.sample(ch, i) + only_b.sample(ch, i);
            assert!((mixed.sample(ch, i) - expected).abs() < 1e-6);
        }
    }
}

#[test]
fn output_stays_within_gain() {
    let mut params = VoiceParams::default();
    params.amp_env = AdsrParams::new(0.0, 0.0, 1.0, 0.1);
    params.filter.cutoff = 20000.0;
    params.gain = 0.5;
    let mut voice = voice_with(&params, 512);

    voice.start_note(69, 1.0, &sound(), CENTRE);
    let mut out = AudioBuffer::new(2, 512);
    voice.render_next_block(&mut out, 0, 512);

    let peak = out
        .channel(0)
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert!(peak > 0.1);
    assert!(peak <= 0.5 * 1.1, "peak {peak}");
}

#[test]
fn filter_cutoff_follows_envelope_each_block() {
    let mut params = VoiceParams::default();
    params.filter.cutoff = 1000.0;
    params.filter_env = AdsrParams::new(0.0, 0.0, 0.5, 0.1);
    let mut voice = voice_with(&params, 64);

    voice.start_note(60, 1.0, &sound(), CENTRE);
    let mut out = AudioBuffer::new(2, 64);

    voice.render_next_block(&mut out, 0, 64);
    assert!((voice.filter().cutoff() - 1000.0).abs() < 1e-3);

    voice.render_next_block(&mut out, 0, 64);
    assert!((voice.filter().cutoff() - 500.0).abs() < 1e-3);
}

#[test]
fn filter_envelope_runs_in_seconds_across_blocks() {
    // At 48 kHz: attack 480 samples, decay 960, release 2400.
    let mut params = VoiceParams::default();
    params.amp_env = AdsrParams::new(0.0, 0.0, 1.0, 1.0);
    params.filter_env = AdsrParams::new(0.01, 0.02, 0.5, 0.05);
    params.filter.cutoff = 2000.0;
    let mut voice = voice_with(&params, 512);

    voice.start_note(60, 1.0, &sound(), CENTRE);
    let mut out = AudioBuffer::new(2, 512);

    // The 10 ms attack peaks inside the first 512-sample block.
    voice.render_next_block(&mut out, 0, 512);
    assert!(voice.filter().cutoff() < 20.0 + 1e-3);
    assert_eq!(voice.filter_envelope().state(), EnvelopeState::Decay);

    voice.render_next_block(&mut out, 0, 512);
    let decaying = voice.filter().cutoff();
    assert!(decaying > 1000.0 && decaying < 2000.0, "cutoff {decaying}");

    // Attack plus decay is 1440 samples, before the fourth block starts.
    voice.render_next_block(&mut out, 0, 512);
    voice.render_next_block(&mut out, 0, 512);
    assert_eq!(voice.filter_envelope().state(), EnvelopeState::Sustain);
    assert!((voice.filter().cutoff() - 1000.0).abs() < 1e-3);

    voice.stop_note(0.0, true);
    for _ in 0..4 {
        voice.render_next_block(&mut out, 0, 512);
    }
    assert_eq!(voice.filter_envelope().state(), EnvelopeState::Release);
    voice.render_next_block(&mut out, 0, 512);
    assert!(!voice.filter_envelope().is_active());
    assert!(voice.is_voice_active(), "amplitude release is still running");
}

#[test]
fn modulated_filter_clamps_cutoff_and_resonance() {
    use tapsynth_core::Processor;

    let mut filter = ModulatedFilter::new();
    filter.prepare(&ProcessSpec::new(SR, 64, 2));

    filter.update_parameters(1.0, FilterType::HighPass, 100_000.0, 50.0);
    assert!(filter.cutoff() <= filter.max_cutoff());
    assert!(filter.resonance() <= 20.0);

    filter.update_parameters(0.0, FilterType::Notch, 1000.0, 1.0);
    assert!(filter.cutoff() >= 20.0);
    assert_eq!(filter.filter_type(), FilterType::Notch);
}

// ---------------------------------------------------------------------------
// 4. Parameter store
// ---------------------------------------------------------------------------

#[test]
fn store_round_trips_named_values() {
    let params = SharedParams::new();
    params.set("attack", 0.25).unwrap();
    params.set("FILTERTYPE", 2.0).unwrap();
    params.set("OSC1WAVETYPE", 1.0).unwrap();

    let snapshot = params.snapshot();
    assert!((snapshot.amp_env.attack - 0.25).abs() < 1e-6);
    assert_eq!(snapshot.filter.filter_type, FilterType::HighPass);
    assert_eq!(snapshot.osc1.waveform, Waveform::Saw);
}

#[test]
fn store_rejects_bad_input() {
    let params = SharedParams::new();
    assert!(matches!(
        params.set("NOPE", 1.0),
        Err(ParamError::UnknownName(_))
    ));
    assert!(matches!(
        params.set("GAIN", f32::NAN),
        Err(ParamError::NonFinite { .. })
    ));
    assert!(matches!(
        params.set("FILTERTYPE", 9.0),
        Err(ParamError::ChoiceOutOfRange { .. })
    ));
    assert!((params.get("GAIN").unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn store_clamps_continuous_values() {
    let params = SharedParams::new();
    params.set("FILTERFREQ", 1.0e6).unwrap();
    params.set("SUSTAIN", -3.0).unwrap();
    assert_eq!(params.get("FILTERFREQ").unwrap(), 20000.0);
    assert_eq!(params.get("SUSTAIN").unwrap(), 0.0);
}

// ---------------------------------------------------------------------------
// 5. Voice pool
// ---------------------------------------------------------------------------

fn pool<const N: usize>(params: Arc<SharedParams>) -> Synthesiser<N> {
    let mut synth = Synthesiser::new(params);
    synth.add_sound(sound());
    synth.prepare_to_play(&ProcessSpec::new(SR, 256, 2));
    synth
}

#[test]
fn pool_plays_chord_and_releases_it() {
    let params = Arc::new(SharedParams::new());
    params.set("RELEASE", 0.01).unwrap();
    let mut synth: Synthesiser<4> = pool(Arc::clone(&params));

    let mut out = AudioBuffer::new(2, 256);
    let chord = [
        MidiEvent::note_on(0, 60, 1.0),
        MidiEvent::note_on(0, 64, 1.0),
        MidiEvent::note_on(0, 67, 1.0),
    ];
    synth.render_next_block(&mut out, &chord, 0, 256);
    assert_eq!(synth.active_voice_count(), 3);
    assert!(out.magnitude(0, 256) > 0.0);

    let release = [
        MidiEvent::note_off(0, 60),
        MidiEvent::note_off(0, 64),
        MidiEvent::note_off(0, 67),
    ];
    out.clear();
    synth.render_next_block(&mut out, &release, 0, 256);
    assert_eq!(synth.active_voice_count(), 3);

    // 10 ms release = 480 samples, two more blocks clear it.
    for _ in 0..2 {
        out.clear();
        synth.render_next_block(&mut out, &[], 0, 256);
    }
    assert_eq!(synth.active_voice_count(), 0);
}

#[test]
fn pool_applies_store_changes_at_block_start() {
    let params = Arc::new(SharedParams::new());
    let mut synth: Synthesiser<2> = pool(Arc::clone(&params));

    params.set("FILTERTYPE", 3.0).unwrap();
    params.set("OSC1WAVETYPE", 2.0).unwrap();

    let mut out = AudioBuffer::new(2, 256);
    synth.render_next_block(&mut out, &[MidiEvent::note_on(0, 60, 1.0)], 0, 256);

    let voice = &synth.voices()[0];
    assert_eq!(voice.params().filter.filter_type, FilterType::Notch);
    assert_eq!(voice.oscillator().waveform(), Waveform::Square);
    assert_eq!(voice.filter().filter_type(), FilterType::Notch);
}

#[test]
fn pool_hard_all_notes_off_frees_everything() {
    let mut synth: Synthesiser<4> = pool(Arc::new(SharedParams::new()));
    let mut out = AudioBuffer::new(2, 256);
    let events = [
        MidiEvent::note_on(0, 48, 1.0),
        MidiEvent::note_on(10, 55, 1.0),
        MidiEvent::new(
            200,
            MidiMessage::AllNotesOff {
                allow_tail_off: false,
            },
        ),
    ];
    synth.render_next_block(&mut out, &events, 0, 256);

    assert_eq!(synth.active_voice_count(), 0);
    assert!(out.channel(0)[201..].iter().all(|&s| s == 0.0));
}
