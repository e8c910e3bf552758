//! Multichannel audio buffer with fixed capacity.
//!
//! [`AudioBuffer`] stores its channels in one contiguous allocation sized at
//! construction (or by [`allocate`](AudioBuffer::allocate), off the audio
//! thread). [`set_size`](AudioBuffer::set_size) only changes the *active*
//! region, so a voice can reuse one scratch buffer for every block without
//! touching the allocator.
//!
//! Samples outside the active region are never exposed, and resizing does
//! not zero anything: callers that read before writing must clear first.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Channel-major multichannel sample buffer.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    /// `capacity_channels * capacity_frames` samples, channel-major
    data: Vec<f32>,
    capacity_channels: usize,
    capacity_frames: usize,
    num_channels: usize,
    num_frames: usize,
}

impl AudioBuffer {
    /// Create a zeroed buffer whose capacity and active size are both
    /// `num_channels × num_frames`.
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            data: vec![0.0; num_channels * num_frames],
            capacity_channels: num_channels,
            capacity_frames: num_frames,
            num_channels,
            num_frames,
        }
    }

    /// Reallocate to a new capacity and zero every sample.
    ///
    /// Allocates. Call from setup code, never from the audio thread.
    pub fn allocate(&mut self, num_channels: usize, num_frames: usize) {
        #[cfg(feature = "tracing")]
        tracing::debug!(num_channels, num_frames, "audio buffer allocate");

        self.data.clear();
        self.data.resize(num_channels * num_frames, 0.0);
        self.capacity_channels = num_channels;
        self.capacity_frames = num_frames;
        self.num_channels = num_channels;
        self.num_frames = num_frames;
    }

    /// Change the active size without allocating or clearing.
    ///
    /// Returns `false` (and leaves the size unchanged) when the request
    /// exceeds the capacity fixed by [`new`](Self::new) or
    /// [`allocate`](Self::allocate).
    #[inline]
    pub fn set_size(&mut self, num_channels: usize, num_frames: usize) -> bool {
        if num_channels > self.capacity_channels || num_frames > self.capacity_frames {
            return false;
        }
        self.num_channels = num_channels;
        self.num_frames = num_frames;
        true
    }

    /// Number of active channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of active frames per channel.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Maximum channel count available without reallocating.
    #[inline]
    pub fn capacity_channels(&self) -> usize {
        self.capacity_channels
    }

    /// Maximum frame count available without reallocating.
    #[inline]
    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    /// Active samples of one channel.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        debug_assert!(channel < self.num_channels);
        let offset = channel * self.capacity_frames;
        &self.data[offset..offset + self.num_frames]
    }

    /// Mutable active samples of one channel.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        debug_assert!(channel < self.num_channels);
        let offset = channel * self.capacity_frames;
        &mut self.data[offset..offset + self.num_frames]
    }

    /// Iterate the active channels mutably.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let frames = self.num_frames;
        self.data
            .chunks_mut(self.capacity_frames.max(1))
            .take(self.num_channels)
            .map(move |chunk| &mut chunk[..frames])
    }

    /// Read one sample.
    #[inline]
    pub fn sample(&self, channel: usize, index: usize) -> f32 {
        self.channel(channel)[index]
    }

    /// Write one sample.
    #[inline]
    pub fn set_sample(&mut self, channel: usize, index: usize, value: f32) {
        self.channel_mut(channel)[index] = value;
    }

    /// Multiply frame `index` on every active channel by `gain`.
    #[inline]
    pub fn scale_frame(&mut self, index: usize, gain: f32) {
        debug_assert!(index < self.num_frames);
        for ch in 0..self.num_channels {
            self.data[ch * self.capacity_frames + index] *= gain;
        }
    }

    /// Multiply every active sample by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for channel in self.channels_mut() {
            for sample in channel.iter_mut() {
                *sample *= gain;
            }
        }
    }

    /// Zero the active region.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }

    /// Add `len` samples of `source` channel `src_channel` (from `src_start`)
    /// into `dest_channel` of this buffer (from `dest_start`), scaled by `gain`.
    ///
    /// Additive: existing content of the destination region is kept.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn add_from(
        &mut self,
        dest_channel: usize,
        dest_start: usize,
        source: &AudioBuffer,
        src_channel: usize,
        src_start: usize,
        len: usize,
        gain: f32,
    ) {
        let src = &source.channel(src_channel)[src_start..src_start + len];
        let dst = &mut self.channel_mut(dest_channel)[dest_start..dest_start + len];
        for (d, s) in dst.iter_mut().zip(src.iter()) {
            *d += *s * gain;
        }
    }

    /// Peak absolute value over `len` frames from `start`, across channels.
    pub fn magnitude(&self, start: usize, len: usize) -> f32 {
        (0..self.num_channels)
            .flat_map(|ch| self.channel(ch)[start..start + len].iter())
            .fold(0.0_f32, |acc, &x| acc.max(x.abs()))
    }

    /// Interleave the active region into `out` (frame-major).
    ///
    /// `out` must hold at least `num_channels × num_frames` samples.
    pub fn write_interleaved(&self, out: &mut [f32]) {
        let channels = self.num_channels;
        debug_assert!(out.len() >= channels * self.num_frames);
        for ch in 0..channels {
            for (i, &s) in self.channel(ch).iter().enumerate() {
                out[i * channels + ch] = s;
            }
        }
    }
}
