//! Typed parameter snapshots for the voice.
//!
//! The audio thread never looks parameters up by name. Once per block the
//! pool takes a [`VoiceParams`] snapshot from the
//! [`SharedParams`](crate::SharedParams) store and hands it to every voice.

use tapsynth_core::SvfOutput;

/// Oscillator waveform.
///
/// Indices match the choice parameters in the named store
/// (`OSC1WAVETYPE`, `OSC2WAVETYPE`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Waveform {
    /// Pure fundamental.
    #[default]
    Sine,
    /// Band-limited sawtooth.
    Saw,
    /// Band-limited square (50% duty).
    Square,
    /// Integrated band-limited square.
    Triangle,
    /// White noise.
    Noise,
}

impl Waveform {
    /// Every waveform, in choice-index order.
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Noise,
    ];

    /// Waveform for a choice index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Choice index of this waveform.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Noise => "noise",
        }
    }

    /// Parse a configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
    }
}

/// Filter response.
///
/// Indices match the `FILTERTYPE` choice parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FilterType {
    /// Low-pass.
    #[default]
    LowPass,
    /// Band-pass.
    BandPass,
    /// High-pass.
    HighPass,
    /// Notch (band-reject).
    Notch,
}

impl FilterType {
    /// Every filter type, in choice-index order.
    pub const ALL: [FilterType; 4] = [
        FilterType::LowPass,
        FilterType::BandPass,
        FilterType::HighPass,
        FilterType::Notch,
    ];

    /// Filter type for a choice index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Choice index of this filter type.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            FilterType::LowPass => "low-pass",
            FilterType::BandPass => "band-pass",
            FilterType::HighPass => "high-pass",
            FilterType::Notch => "notch",
        }
    }

    /// Parse a configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// State-variable filter output implementing this response.
    pub fn svf_output(self) -> SvfOutput {
        match self {
            FilterType::LowPass => SvfOutput::Lowpass,
            FilterType::BandPass => SvfOutput::Bandpass,
            FilterType::HighPass => SvfOutput::Highpass,
            FilterType::Notch => SvfOutput::Notch,
        }
    }
}

/// Oscillator settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OscParams {
    /// Carrier waveform.
    pub waveform: Waveform,
    /// Modulator frequency in Hz.
    pub fm_frequency: f32,
    /// Modulation depth in Hz of carrier deviation.
    pub fm_depth: f32,
}

impl Default for OscParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            fm_frequency: 0.0,
            fm_depth: 0.0,
        }
    }
}

/// Envelope settings: times in seconds, sustain as a level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdsrParams {
    /// Attack time (s).
    pub attack: f32,
    /// Decay time (s).
    pub decay: f32,
    /// Sustain level, 0.0..=1.0.
    pub sustain: f32,
    /// Release time (s).
    pub release: f32,
}

impl AdsrParams {
    /// Build envelope settings.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self::new(0.1, 0.1, 1.0, 0.4)
    }
}

/// Filter settings before envelope modulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterParams {
    /// Response type.
    pub filter_type: FilterType,
    /// Base cutoff in Hz, scaled by the filter envelope.
    pub cutoff: f32,
    /// Resonance (Q).
    pub resonance: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            filter_type: FilterType::LowPass,
            cutoff: 200.0,
            resonance: 1.0,
        }
    }
}

/// Everything one voice reads per block.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoiceParams {
    /// Rendered oscillator.
    pub osc1: OscParams,
    /// Second oscillator settings, carried at the parameter boundary.
    pub osc2: OscParams,
    /// Amplitude envelope.
    pub amp_env: AdsrParams,
    /// Filter-modulation envelope.
    pub filter_env: AdsrParams,
    /// Filter base settings.
    pub filter: FilterParams,
    /// Output gain, linear 0.0..=1.0.
    pub gain: f32,
}

/// Output gain applied when nothing else is configured (headroom for
/// several summed voices).
pub const DEFAULT_GAIN: f32 = 0.3;

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            osc1: OscParams::default(),
            osc2: OscParams::default(),
            amp_env: AdsrParams::default(),
            filter_env: AdsrParams::default(),
            filter: FilterParams::default(),
            gain: DEFAULT_GAIN,
        }
    }
}
