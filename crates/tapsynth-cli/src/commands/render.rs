//! Offline note rendering command.

use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tapsynth_config::SessionConfig;
use tapsynth_core::AudioBuffer;
use tapsynth_core::math::seconds_to_samples;
use tapsynth_synth::{
    MidiEvent, ParamId, SharedParams, Sound, SynthSound, Synthesiser, Waveform,
};

use crate::wav::write_wav_f32;

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Saw => Waveform::Saw,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Triangle => Waveform::Triangle,
            CliWaveform::Noise => Waveform::Noise,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// MIDI notes (comma-separated, e.g., "60,64,67" for C major)
    #[arg(long, default_value = "60,64,67")]
    notes: String,

    /// Note-on velocity (0-1]
    #[arg(long, default_value = "1.0")]
    velocity: f32,

    /// Seconds between note-on and note-off
    #[arg(long, default_value = "1.0")]
    hold: f32,

    /// Seconds rendered after note-off
    #[arg(long, default_value = "0.5")]
    tail: f32,

    /// Override the oscillator waveform
    #[arg(long, value_enum)]
    waveform: Option<CliWaveform>,

    /// Override the filter base cutoff in Hz
    #[arg(long)]
    cutoff: Option<f32>,

    /// Override a named parameter, e.g. --set ATTACK=0.01 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,
}

fn parse_notes(notes: &str) -> anyhow::Result<Vec<u8>> {
    let notes = notes
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| -> anyhow::Result<u8> {
            let note: u8 = s.parse().with_context(|| format!("invalid MIDI note '{s}'"))?;
            if note > 127 {
                anyhow::bail!("MIDI note {note} out of range (0-127)");
            }
            Ok(note)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if notes.is_empty() {
        anyhow::bail!("No MIDI notes provided. Use format: --notes \"60,64,67\"");
    }
    Ok(notes)
}

fn parse_override(assignment: &str) -> anyhow::Result<(&str, f32)> {
    let (name, value) = assignment
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, got '{assignment}'"))?;
    let value: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid value in '{assignment}'"))?;
    Ok((name.trim(), value))
}

/// Note-ons at frame 0, note-offs at `hold_frames`, sorted by frame.
fn schedule(notes: &[u8], velocity: f32, hold_frames: usize) -> Vec<MidiEvent> {
    let ons = notes.iter().map(|&n| MidiEvent::note_on(0, n, velocity));
    let offs = notes.iter().map(|&n| MidiEvent::note_off(hold_frames, n));
    ons.chain(offs).collect()
}

/// Render `total_frames` through an `N`-voice pool, returning interleaved
/// samples.
fn render_pool<const N: usize>(
    params: Arc<SharedParams>,
    session: &SessionConfig,
    events: &[MidiEvent],
    total_frames: usize,
) -> Vec<f32> {
    let spec = session.process_spec();
    let mut synth: Synthesiser<N> = Synthesiser::new(params);
    synth.add_sound(Sound::from(SynthSound::new()));
    synth.prepare_to_play(&spec);
    synth.set_gain_ramp(session.gain_ramp);

    let channels = spec.num_channels;
    let block_size = spec.maximum_block_size;
    let mut buffer = AudioBuffer::new(channels, block_size);
    let mut block_events = Vec::with_capacity(events.len());
    let mut interleaved = vec![0.0f32; total_frames * channels];

    let mut start = 0;
    while start < total_frames {
        let len = block_size.min(total_frames - start);
        if !buffer.set_size(channels, len) {
            break;
        }
        buffer.clear();

        block_events.clear();
        block_events.extend(
            events
                .iter()
                .filter(|e| e.offset >= start && e.offset < start + len)
                .map(|e| MidiEvent::new(e.offset - start, e.message)),
        );

        synth.render_next_block(&mut buffer, &block_events, 0, len);
        buffer.write_interleaved(&mut interleaved[start * channels..(start + len) * channels]);
        start += len;
    }

    interleaved
}

/// Pool sizes are fixed at compile time; pick the smallest that fits.
fn render_polyphonic(
    session: &SessionConfig,
    params: Arc<SharedParams>,
    events: &[MidiEvent],
    total_frames: usize,
) -> (usize, Vec<f32>) {
    match session.polyphony {
        0..=4 => (4, render_pool::<4>(params, session, events, total_frames)),
        5..=8 => (8, render_pool::<8>(params, session, events, total_frames)),
        9..=16 => (16, render_pool::<16>(params, session, events, total_frames)),
        17..=32 => (32, render_pool::<32>(params, session, events, total_frames)),
        _ => (64, render_pool::<64>(params, session, events, total_frames)),
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let notes = parse_notes(&args.notes)?;

    if !(args.velocity > 0.0 && args.velocity <= 1.0) {
        anyhow::bail!("velocity must be in (0, 1], got {}", args.velocity);
    }
    if !(args.hold >= 0.0 && args.tail >= 0.0) {
        anyhow::bail!("--hold and --tail must be non-negative");
    }

    let params = Arc::new(SharedParams::from_voice_params(&config.voice));
    if let Some(waveform) = args.waveform {
        params.set_id(ParamId::Osc1WaveType, Waveform::from(waveform).index() as f32)?;
    }
    if let Some(cutoff) = args.cutoff {
        params.set_id(ParamId::FilterFreq, cutoff)?;
    }
    for assignment in &args.overrides {
        let (name, value) = parse_override(assignment)?;
        params
            .set(name, value)
            .with_context(|| format!("applying --set {assignment}"))?;
    }

    let spec = config.process_spec();
    let hold_frames = seconds_to_samples(args.hold, spec.sample_rate);
    let total_frames = hold_frames + seconds_to_samples(args.tail, spec.sample_rate);
    let events = schedule(&notes, args.velocity, hold_frames);

    if notes.len() > config.session.polyphony {
        tracing::warn!(
            notes = notes.len(),
            polyphony = config.session.polyphony,
            "more notes than voices, extra notes will be dropped"
        );
    }

    println!("Rendering {} note(s): {:?}", notes.len(), notes);
    println!(
        "  {:.2}s hold + {:.2}s tail at {} Hz, {} channel(s)",
        args.hold, args.tail, config.session.sample_rate, spec.num_channels
    );

    let (pool_size, samples) = render_polyphonic(&config.session, params, &events, total_frames);
    tracing::info!(voices = pool_size, frames = total_frames, "render complete");

    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    let channels = u16::try_from(spec.num_channels).context("too many output channels")?;
    write_wav_f32(&args.output, &samples, channels, config.session.sample_rate)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} frames to {} (peak {:.3})",
        total_frames,
        args.output.display(),
        peak
    );
    Ok(())
}
