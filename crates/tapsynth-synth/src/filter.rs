//! Envelope-modulated multichannel filter stage.
//!
//! One [`StateVariableFilter`] per channel. Coefficients are refreshed once
//! per block through [`ModulatedFilter::update_parameters`]; the effective
//! cutoff is the base cutoff scaled by the modulation sample.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use tapsynth_core::{AudioBuffer, ProcessSpec, Processor, StateVariableFilter, svf};

use crate::params::FilterType;

/// Upper cutoff bound independent of the sample rate.
pub const MAX_CUTOFF_HZ: f32 = 20000.0;

/// Multichannel filter whose cutoff follows a modulation source.
///
/// # Example
///
/// ```rust
/// use tapsynth_core::{AudioBuffer, ProcessSpec, Processor};
/// use tapsynth_synth::{FilterType, ModulatedFilter};
///
/// let mut filter = ModulatedFilter::new();
/// filter.prepare(&ProcessSpec::new(48000.0, 64, 2));
/// filter.update_parameters(0.5, FilterType::LowPass, 2000.0, 0.707);
/// assert_eq!(filter.cutoff(), 1000.0);
///
/// let mut buffer = AudioBuffer::new(2, 64);
/// filter.process(&mut buffer);
/// ```
#[derive(Debug, Clone)]
pub struct ModulatedFilter {
    filters: Vec<StateVariableFilter>,
    sample_rate: f32,
    filter_type: FilterType,
    cutoff: f32,
    resonance: f32,
}

impl Default for ModulatedFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModulatedFilter {
    /// Unprepared low-pass filter at 1 kHz. Processes nothing until
    /// [`prepare`](Processor::prepare) has sized the per-channel state.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sample_rate: 48000.0,
            filter_type: FilterType::LowPass,
            cutoff: 1000.0,
            resonance: core::f32::consts::FRAC_1_SQRT_2,
        }
    }

    /// Highest cutoff allowed at the prepared sample rate.
    pub fn max_cutoff(&self) -> f32 {
        MAX_CUTOFF_HZ.min(self.sample_rate * svf::MAX_CUTOFF_RATIO)
    }

    /// Recompute cutoff and resonance from a modulation sample and the base
    /// settings, and push them into every channel's filter.
    ///
    /// The effective cutoff is `base_cutoff × modulation`, clamped to
    /// 20 Hz..=min(20 kHz, 0.49 × sample rate). Resonance is clamped to
    /// 0.1..=20.
    pub fn update_parameters(
        &mut self,
        modulation: f32,
        filter_type: FilterType,
        base_cutoff: f32,
        base_resonance: f32,
    ) {
        let cutoff = base_cutoff * modulation;
        let cutoff = if cutoff.is_finite() {
            cutoff
        } else {
            svf::MIN_CUTOFF_HZ
        };
        self.cutoff = cutoff.clamp(svf::MIN_CUTOFF_HZ, self.max_cutoff());

        self.resonance = if base_resonance.is_finite() {
            base_resonance.clamp(svf::MIN_RESONANCE, svf::MAX_RESONANCE)
        } else {
            svf::MIN_RESONANCE
        };
        self.filter_type = filter_type;

        let output = filter_type.svf_output();
        for filter in &mut self.filters {
            filter.set_output(output);
            filter.set_cutoff(self.cutoff);
            filter.set_resonance(self.resonance);
        }
    }

    /// Effective cutoff from the last update, in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Effective resonance from the last update.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Response from the last update.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Number of channels with filter state.
    pub fn num_channels(&self) -> usize {
        self.filters.len()
    }
}

impl Processor for ModulatedFilter {
    fn prepare(&mut self, spec: &ProcessSpec) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = spec.sample_rate,
            channels = spec.num_channels,
            "filter prepare"
        );

        if spec.sample_rate > 0.0 {
            self.sample_rate = spec.sample_rate;
        }
        self.filters.clear();
        self.filters
            .resize_with(spec.num_channels, || StateVariableFilter::new(self.sample_rate));

        let cutoff = self.cutoff;
        self.update_parameters(1.0, self.filter_type, cutoff, self.resonance);
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        for (channel, filter) in buffer.channels_mut().zip(self.filters.iter_mut()) {
            filter.process_slice(channel);
        }
    }

    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
