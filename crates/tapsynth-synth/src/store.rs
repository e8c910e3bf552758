//! Named parameter store shared between control threads and the audio thread.
//!
//! Each parameter lives in an [`AtomicParam`]. Control code (UI, automation,
//! configuration loading) writes by name; the audio thread calls
//! [`SharedParams::snapshot`] once per block, which only performs atomic
//! loads and never allocates.

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

use tapsynth_core::AtomicParam;
use thiserror::Error;

use crate::params::{AdsrParams, FilterParams, FilterType, OscParams, VoiceParams, Waveform};

/// Errors from writing or reading the store by name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// No parameter has this name.
    #[error("unknown parameter '{0}'")]
    UnknownName(String),

    /// NaN or infinite value written.
    #[error("parameter {name}: value {value} is not finite")]
    NonFinite {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// Choice index outside the list of options.
    #[error("parameter {name}: choice {value} out of range (0..{count})")]
    ChoiceOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f32,
        /// Number of options.
        count: usize,
    },
}

/// Every parameter the voice reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Oscillator 1 waveform choice.
    Osc1WaveType,
    /// Oscillator 1 FM frequency (Hz).
    Osc1FmFreq,
    /// Oscillator 1 FM depth (Hz).
    Osc1FmDepth,
    /// Oscillator 2 waveform choice.
    Osc2WaveType,
    /// Oscillator 2 FM frequency (Hz).
    Osc2FmFreq,
    /// Oscillator 2 FM depth (Hz).
    Osc2FmDepth,
    /// Amplitude attack (s).
    Attack,
    /// Amplitude decay (s).
    Decay,
    /// Amplitude sustain level.
    Sustain,
    /// Amplitude release (s).
    Release,
    /// Filter envelope attack (s).
    FilterAttack,
    /// Filter envelope decay (s).
    FilterDecay,
    /// Filter envelope sustain level.
    FilterSustain,
    /// Filter envelope release (s).
    FilterRelease,
    /// Filter type choice.
    FilterType,
    /// Filter base cutoff (Hz).
    FilterFreq,
    /// Filter resonance.
    FilterRes,
    /// Output gain, linear.
    Gain,
}

/// Static description of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamInfo {
    /// Identifier.
    pub id: ParamId,
    /// Name used by the store, e.g. `"FILTERFREQ"`.
    pub name: &'static str,
    /// Lowest value.
    pub min: f32,
    /// Highest value.
    pub max: f32,
    /// Initial value.
    pub default: f32,
    /// Unit label for display.
    pub unit: &'static str,
    /// Option names for choice parameters; empty for continuous ones.
    pub choices: &'static [&'static str],
}

impl ParamInfo {
    /// `true` for enumerated parameters.
    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }
}

const WAVE_CHOICES: &[&str] = &["sine", "saw", "square", "triangle", "noise"];
const FILTER_CHOICES: &[&str] = &["low-pass", "band-pass", "high-pass", "notch"];

const fn continuous(
    id: ParamId,
    name: &'static str,
    min: f32,
    max: f32,
    default: f32,
    unit: &'static str,
) -> ParamInfo {
    ParamInfo {
        id,
        name,
        min,
        max,
        default,
        unit,
        choices: &[],
    }
}

const fn choice(id: ParamId, name: &'static str, choices: &'static [&'static str]) -> ParamInfo {
    ParamInfo {
        id,
        name,
        min: 0.0,
        max: (choices.len() - 1) as f32,
        default: 0.0,
        unit: "",
        choices,
    }
}

/// Every parameter, in [`ParamId`] order.
pub const PARAMS: [ParamInfo; ParamId::COUNT] = [
    choice(ParamId::Osc1WaveType, "OSC1WAVETYPE", WAVE_CHOICES),
    continuous(ParamId::Osc1FmFreq, "OSC1FMFREQ", 0.0, 1000.0, 0.0, "Hz"),
    continuous(ParamId::Osc1FmDepth, "OSC1FMDEPTH", 0.0, 1000.0, 0.0, "Hz"),
    choice(ParamId::Osc2WaveType, "OSC2WAVETYPE", WAVE_CHOICES),
    continuous(ParamId::Osc2FmFreq, "OSC2FMFREQ", 0.0, 1000.0, 0.0, "Hz"),
    continuous(ParamId::Osc2FmDepth, "OSC2FMDEPTH", 0.0, 1000.0, 0.0, "Hz"),
    continuous(ParamId::Attack, "ATTACK", 0.0, 1.0, 0.1, "s"),
    continuous(ParamId::Decay, "DECAY", 0.0, 1.0, 0.1, "s"),
    continuous(ParamId::Sustain, "SUSTAIN", 0.0, 1.0, 1.0, ""),
    continuous(ParamId::Release, "RELEASE", 0.0, 3.0, 0.4, "s"),
    continuous(ParamId::FilterAttack, "FILTERATTACK", 0.0, 1.0, 0.1, "s"),
    continuous(ParamId::FilterDecay, "FILTERDECAY", 0.0, 1.0, 0.1, "s"),
    continuous(ParamId::FilterSustain, "FILTERSUSTAIN", 0.0, 1.0, 1.0, ""),
    continuous(ParamId::FilterRelease, "FILTERRELEASE", 0.0, 3.0, 0.4, "s"),
    choice(ParamId::FilterType, "FILTERTYPE", FILTER_CHOICES),
    continuous(ParamId::FilterFreq, "FILTERFREQ", 20.0, 20000.0, 200.0, "Hz"),
    continuous(ParamId::FilterRes, "FILTERRES", 0.1, 10.0, 1.0, ""),
    continuous(ParamId::Gain, "GAIN", 0.0, 1.0, 0.3, ""),
];

impl ParamId {
    /// Number of parameters.
    pub const COUNT: usize = 18;

    /// Every identifier, in store order.
    pub const ALL: [ParamId; ParamId::COUNT] = [
        ParamId::Osc1WaveType,
        ParamId::Osc1FmFreq,
        ParamId::Osc1FmDepth,
        ParamId::Osc2WaveType,
        ParamId::Osc2FmFreq,
        ParamId::Osc2FmDepth,
        ParamId::Attack,
        ParamId::Decay,
        ParamId::Sustain,
        ParamId::Release,
        ParamId::FilterAttack,
        ParamId::FilterDecay,
        ParamId::FilterSustain,
        ParamId::FilterRelease,
        ParamId::FilterType,
        ParamId::FilterFreq,
        ParamId::FilterRes,
        ParamId::Gain,
    ];

    /// Static description.
    pub fn info(self) -> &'static ParamInfo {
        &PARAMS[self as usize]
    }

    /// Store name.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Look up by store name (case-insensitive).
    ///
    /// Scans the whole table comparing strings. Resolve names once, off the
    /// audio thread, and use [`ParamId`] or [`SharedParams::snapshot`] from
    /// the render path.
    pub fn from_name(name: &str) -> Option<Self> {
        PARAMS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }
}

/// Lock-free named parameter store.
///
/// # Example
///
/// ```rust
/// use tapsynth_synth::{FilterType, SharedParams};
///
/// let params = SharedParams::new();
/// params.set("FILTERFREQ", 1200.0).unwrap();
/// params.set("FILTERTYPE", 2.0).unwrap();
///
/// let snapshot = params.snapshot();
/// assert_eq!(snapshot.filter.cutoff, 1200.0);
/// assert_eq!(snapshot.filter.filter_type, FilterType::HighPass);
/// assert!(params.set("VOLUME", 1.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SharedParams {
    values: [AtomicParam; ParamId::COUNT],
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    /// Store holding every default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| {
                let info = &PARAMS[i];
                AtomicParam::new(info.default, info.min, info.max)
            }),
        }
    }

    /// Store holding the values of `params`.
    pub fn from_voice_params(params: &VoiceParams) -> Self {
        let store = Self::new();
        store.apply(params);
        store
    }

    /// Descriptions of every parameter.
    pub fn infos(&self) -> &'static [ParamInfo] {
        &PARAMS
    }

    /// Current value by identifier.
    #[inline]
    pub fn get_id(&self, id: ParamId) -> f32 {
        self.values[id as usize].get()
    }

    /// Current value by name.
    pub fn get(&self, name: &str) -> Result<f32, ParamError> {
        let id = ParamId::from_name(name).ok_or_else(|| ParamError::UnknownName(name.to_string()))?;
        Ok(self.get_id(id))
    }

    /// Write by identifier. Continuous values are clamped to range; choice
    /// values are rounded to the nearest index and must name an option.
    pub fn set_id(&self, id: ParamId, value: f32) -> Result<(), ParamError> {
        let info = id.info();
        if !value.is_finite() {
            return Err(ParamError::NonFinite {
                name: info.name,
                value,
            });
        }

        let value = if info.is_choice() {
            let index = libm::roundf(value);
            if index < 0.0 || index > info.max {
                return Err(ParamError::ChoiceOutOfRange {
                    name: info.name,
                    value,
                    count: info.choices.len(),
                });
            }
            index
        } else {
            value
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(param = info.name, value, "param set");

        self.values[id as usize].set(value);
        Ok(())
    }

    /// Write by name.
    pub fn set(&self, name: &str, value: f32) -> Result<(), ParamError> {
        let id = ParamId::from_name(name).ok_or_else(|| ParamError::UnknownName(name.to_string()))?;
        self.set_id(id, value)
    }

    /// Restore every default.
    pub fn reset(&self) {
        for value in &self.values {
            value.reset();
        }
    }

    /// Write every value from a typed snapshot (clamped to range).
    pub fn apply(&self, params: &VoiceParams) {
        let store = |id: ParamId, value: f32| self.values[id as usize].set(value);

        store(ParamId::Osc1WaveType, params.osc1.waveform.index() as f32);
        store(ParamId::Osc1FmFreq, params.osc1.fm_frequency);
        store(ParamId::Osc1FmDepth, params.osc1.fm_depth);
        store(ParamId::Osc2WaveType, params.osc2.waveform.index() as f32);
        store(ParamId::Osc2FmFreq, params.osc2.fm_frequency);
        store(ParamId::Osc2FmDepth, params.osc2.fm_depth);
        store(ParamId::Attack, params.amp_env.attack);
        store(ParamId::Decay, params.amp_env.decay);
        store(ParamId::Sustain, params.amp_env.sustain);
        store(ParamId::Release, params.amp_env.release);
        store(ParamId::FilterAttack, params.filter_env.attack);
        store(ParamId::FilterDecay, params.filter_env.decay);
        store(ParamId::FilterSustain, params.filter_env.sustain);
        store(ParamId::FilterRelease, params.filter_env.release);
        store(ParamId::FilterType, params.filter.filter_type.index() as f32);
        store(ParamId::FilterFreq, params.filter.cutoff);
        store(ParamId::FilterRes, params.filter.resonance);
        store(ParamId::Gain, params.gain);
    }

    /// Read every value into a typed snapshot. Atomic loads only.
    pub fn snapshot(&self) -> VoiceParams {
        let get = |id: ParamId| self.get_id(id);
        let choice = |id: ParamId| libm::roundf(get(id)).max(0.0) as usize;

        let osc = |wave, freq, depth| OscParams {
            waveform: Waveform::from_index(choice(wave)).unwrap_or_default(),
            fm_frequency: get(freq),
            fm_depth: get(depth),
        };
        let adsr = |a, d, s, r| AdsrParams::new(get(a), get(d), get(s), get(r));

        VoiceParams {
            osc1: osc(ParamId::Osc1WaveType, ParamId::Osc1FmFreq, ParamId::Osc1FmDepth),
            osc2: osc(ParamId::Osc2WaveType, ParamId::Osc2FmFreq, ParamId::Osc2FmDepth),
            amp_env: adsr(ParamId::Attack, ParamId::Decay, ParamId::Sustain, ParamId::Release),
            filter_env: adsr(
                ParamId::FilterAttack,
                ParamId::FilterDecay,
                ParamId::FilterSustain,
                ParamId::FilterRelease,
            ),
            filter: FilterParams {
                filter_type: FilterType::from_index(choice(ParamId::FilterType))
                    .unwrap_or_default(),
                cutoff: get(ParamId::FilterFreq),
                resonance: get(ParamId::FilterRes),
            },
            gain: get(ParamId::Gain),
        }
    }
}
