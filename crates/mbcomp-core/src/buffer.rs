//! Audio buffer abstractions for block processing.
//!
//! This module provides two buffer types:
//!
//! - **[`Buffer`]**: a borrowed, in-place view over the host's channel slices.
//!   Valid for a single `process()` call.
//! - **[`AudioBuffer`]**: an owned, planar scratch container sized once at
//!   configuration time (channel count × maximum block size) and reused for
//!   every block.
//!
//! # Real-Time Safety
//!
//! [`Buffer`] uses fixed-size stack storage for its channel table, so building
//! one inside the audio callback never allocates. [`AudioBuffer`] allocates in
//! [`AudioBuffer::new`] only; changing the active block length with
//! [`AudioBuffer::set_num_samples`] never reallocates.
//!
//! # Example
//!
//! ```ignore
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! let mut buffer = Buffer::new([left.as_mut_slice(), right.as_mut_slice()], 256);
//!
//! let mut scratch = AudioBuffer::<f64>::new(2, 512);
//! scratch.copy_from_buffer(&buffer);
//! ```

use std::ops::Range;

use crate::sample::Sample;
use crate::types::MAX_CHANNELS;

// =============================================================================
// Buffer - In-place host I/O
// =============================================================================

/// In-place audio buffer handed over by the host for one processing block.
///
/// Channels are processed in place: each slice holds the input on entry and
/// must hold the output on return. When the host has fewer input channels than
/// output channels, the extra channels contain garbage on entry; see
/// [`clear_unused_outputs`](Self::clear_unused_outputs).
///
/// # Type Parameter
///
/// `S` is the sample type, defaulting to `f32`. Use `Buffer<f64>` for
/// double precision hosts.
///
/// # Channel Layout
///
/// Channels are indexed starting from 0 (stereo: 0 = Left, 1 = Right).
/// Channels beyond [`MAX_CHANNELS`] are silently ignored.
pub struct Buffer<'a, S: Sample = f32> {
    /// Channel slices (input on entry, output on return)
    channels: [Option<&'a mut [S]>; MAX_CHANNELS],
    /// Number of channels present in the buffer
    num_channels: usize,
    /// Number of leading channels that carry input data
    num_input_channels: usize,
    /// Number of samples in this processing block
    num_samples: usize,
}

impl<'a, S: Sample> Buffer<'a, S> {
    /// Create a new buffer from channel slices.
    ///
    /// Every channel is considered to carry input. The block length is
    /// clamped to the shortest channel slice.
    #[inline]
    pub fn new(channels: impl IntoIterator<Item = &'a mut [S]>, num_samples: usize) -> Self {
        // Can't use [None; N] for &mut because it's not Copy
        let mut table: [Option<&'a mut [S]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        let mut num_channels = 0;
        let mut num_samples = num_samples;
        for (i, slice) in channels.into_iter().take(MAX_CHANNELS).enumerate() {
            num_samples = num_samples.min(slice.len());
            table[i] = Some(slice);
            num_channels = i + 1;
        }

        Self {
            channels: table,
            num_channels,
            num_input_channels: num_channels,
            num_samples,
        }
    }

    /// Declare how many leading channels carry input data.
    ///
    /// Clamped to the number of channels present.
    #[inline]
    pub fn with_input_channels(mut self, num_input_channels: usize) -> Self {
        self.num_input_channels = num_input_channels.min(self.num_channels);
        self
    }

    // =========================================================================
    // Buffer Info
    // =========================================================================

    /// Number of samples in this processing block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of channels present (outputs).
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of channels that carry input data.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    // =========================================================================
    // Channel Access
    // =========================================================================

    /// Get a channel by index.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[S] {
        self.channels
            .get(channel)
            .and_then(|opt| opt.as_deref())
            .map(|ch| &ch[..self.num_samples])
            .unwrap_or(&[])
    }

    /// Get a mutable channel by index.
    ///
    /// Returns `None` if the channel doesn't exist.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [S]> {
        let n = self.num_samples;
        self.channels
            .get_mut(channel)
            .and_then(|opt| opt.as_deref_mut())
            .map(|ch| &mut ch[..n])
    }

    /// Iterate over all channels mutably.
    #[inline]
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [S]> + use<'_, 'a, S> {
        let n = self.num_samples;
        self.channels[..self.num_channels]
            .iter_mut()
            .filter_map(move |opt| opt.as_deref_mut().map(|ch| &mut ch[..n]))
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Zero every channel.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(S::ZERO);
        }
    }

    /// Zero the channels that did not receive input data.
    ///
    /// Those channels are not guaranteed to be empty on entry and would
    /// otherwise leak garbage to the output.
    pub fn clear_unused_outputs(&mut self) {
        let n = self.num_samples;
        for ch in self.channels[self.num_input_channels..self.num_channels]
            .iter_mut()
            .flatten()
        {
            ch[..n].fill(S::ZERO);
        }
    }

    /// Borrow a sub-range of frames as a shorter buffer.
    ///
    /// The range is clamped to the block length. Used to split host blocks
    /// that are longer than the configured maximum block size.
    pub fn sub_block(&mut self, range: Range<usize>) -> Buffer<'_, S> {
        let end = range.end.min(self.num_samples);
        let start = range.start.min(end);

        let mut channels: [Option<&mut [S]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        for (dst, src) in channels.iter_mut().zip(self.channels.iter_mut()) {
            *dst = src.as_deref_mut().map(|ch| &mut ch[start..end]);
        }

        Buffer {
            channels,
            num_channels: self.num_channels,
            num_input_channels: self.num_input_channels,
            num_samples: end - start,
        }
    }
}

// =============================================================================
// AudioBuffer - Owned planar scratch storage
// =============================================================================

/// Owned planar audio buffer used as scratch storage between stages.
///
/// Storage is one contiguous allocation of `num_channels × capacity` samples.
/// The active block length (`num_samples`) can change every block without
/// touching the allocation.
#[derive(Debug, Clone)]
pub struct AudioBuffer<S: Sample = f64> {
    data: Vec<S>,
    num_channels: usize,
    capacity: usize,
    num_samples: usize,
}

impl<S: Sample> AudioBuffer<S> {
    /// Allocate a zeroed buffer. Call this at configuration time only.
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            data: vec![S::ZERO; num_channels * capacity],
            num_channels,
            capacity,
            num_samples: capacity,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Maximum number of samples per channel.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Active number of samples per channel.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Set the active block length, clamped to the capacity.
    #[inline]
    pub fn set_num_samples(&mut self, num_samples: usize) {
        debug_assert!(num_samples <= self.capacity, "block exceeds scratch capacity");
        self.num_samples = num_samples.min(self.capacity);
    }

    /// Active samples of a channel.
    ///
    /// # Panics
    ///
    /// Panics if the channel index is out of bounds.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[S] {
        assert!(channel < self.num_channels, "channel out of bounds");
        let start = channel * self.capacity;
        &self.data[start..start + self.num_samples]
    }

    /// Active samples of a channel, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the channel index is out of bounds.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [S] {
        assert!(channel < self.num_channels, "channel out of bounds");
        let start = channel * self.capacity;
        &mut self.data[start..start + self.num_samples]
    }

    /// Iterate over the active samples of every channel.
    #[inline]
    pub fn channels(&self) -> impl Iterator<Item = &[S]> + '_ {
        let n = self.num_samples;
        self.data
            .chunks_exact(self.capacity.max(1))
            .take(self.num_channels)
            .map(move |ch| &ch[..n])
    }

    /// Iterate mutably over the active samples of every channel.
    #[inline]
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [S]> + '_ {
        let n = self.num_samples;
        self.data
            .chunks_exact_mut(self.capacity.max(1))
            .take(self.num_channels)
            .map(move |ch| &mut ch[..n])
    }

    /// Zero the active samples of every channel.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(S::ZERO);
        }
    }

    /// Copy another scratch buffer of the same geometry into this one.
    ///
    /// Takes over the source's active block length.
    pub fn copy_from(&mut self, other: &AudioBuffer<S>) {
        self.set_num_samples(other.num_samples);
        for (dst, src) in self.channels_mut().zip(other.channels()) {
            dst.copy_from_slice(src);
        }
    }

    /// Copy a host buffer into this one, converting the sample type.
    ///
    /// Takes over the host block length. Channels missing from the host
    /// buffer are zeroed.
    pub fn copy_from_buffer<T: Sample>(&mut self, buffer: &Buffer<'_, T>) {
        self.set_num_samples(buffer.num_samples());
        for ch in 0..self.num_channels {
            let src = buffer.channel(ch);
            let dst = self.channel_mut(ch);
            if src.len() == dst.len() {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = S::from_f64(s.to_f64());
                }
            } else {
                dst.fill(S::ZERO);
            }
        }
    }

    /// Write this buffer's active samples over a host buffer, converting the
    /// sample type.
    pub fn write_into<T: Sample>(&self, buffer: &mut Buffer<'_, T>) {
        for (ch, src) in self.channels().enumerate() {
            if let Some(dst) = buffer.channel_mut(ch) {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = T::from_f64(s.to_f64());
                }
            }
        }
    }

    /// Add another scratch buffer's active samples into this one.
    pub fn add_from(&mut self, other: &AudioBuffer<S>) {
        for (dst, src) in self.channels_mut().zip(other.channels()) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = *d + *s;
            }
        }
    }

    /// Scale every active sample by a constant.
    pub fn apply_gain(&mut self, gain: S) {
        for channel in self.channels_mut() {
            for sample in channel.iter_mut() {
                *sample = *sample * gain;
            }
        }
    }
}
