//! Two-phase processor lifecycle.
//!
//! - **[`Plugin`]** (unprepared): owns the parameters and nothing that
//!   depends on the sample rate or block size.
//! - **[`AudioProcessor`]** (prepared): owns every buffer and filter state,
//!   sized for one [`AudioSetup`]. Created by [`Plugin::prepare`], turned back
//!   into a plugin by [`AudioProcessor::unprepare`].
//!
//! ```text
//!   Plugin ──prepare(setup)──▶ AudioProcessor ──process()── (audio context)
//!     ▲                             │
//!     └─────────unprepare()─────────┘
//! ```
//!
//! Reconfiguration (new sample rate, block size or layout) is `unprepare`
//! followed by `prepare`. Both consume `self`, so the audio context cannot
//! process while buffers are being resized.

use std::fmt;

use log::warn;

use crate::buffer::Buffer;
use crate::error::PluginError;
use crate::parameter_store::Parameters;
use crate::sample::Sample;
use crate::types::MAX_CHANNELS;

/// Channel counts of the main input and output buses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusLayout {
    pub input_channels: usize,
    pub output_channels: usize,
}

impl BusLayout {
    pub const fn mono() -> Self {
        Self {
            input_channels: 1,
            output_channels: 1,
        }
    }

    pub const fn stereo() -> Self {
        Self {
            input_channels: 2,
            output_channels: 2,
        }
    }
}

impl Default for BusLayout {
    fn default() -> Self {
        Self::stereo()
    }
}

/// Stream configuration handed to [`Plugin::prepare`].
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSetup {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block the host will pass to one `process()` call.
    pub max_block_size: usize,
    pub layout: BusLayout,
}

impl AudioSetup {
    pub fn new(sample_rate: f64, max_block_size: usize, layout: BusLayout) -> Self {
        Self {
            sample_rate,
            max_block_size,
            layout,
        }
    }

    /// Reject values no processor can work with.
    ///
    /// Layout restrictions specific to a plugin are checked by
    /// [`Plugin::check_layout`].
    pub fn validate(&self) -> Result<(), PluginError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(PluginError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(PluginError::InvalidBlockSize);
        }
        let channels = self.layout.input_channels.max(self.layout.output_channels);
        if channels > MAX_CHANNELS {
            return Err(PluginError::TooManyChannels(channels));
        }
        Ok(())
    }
}

/// A rejected [`Plugin::prepare`]: the untouched plugin and the reason.
pub struct PrepareError<P> {
    pub plugin: P,
    pub error: PluginError,
}

impl<P> PrepareError<P> {
    pub fn new(plugin: P, error: PluginError) -> Self {
        Self { plugin, error }
    }

    /// Discard the plugin and keep the error.
    pub fn into_error(self) -> PluginError {
        self.error
    }
}

impl<P> fmt::Debug for PrepareError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<P> fmt::Display for PrepareError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prepare failed: {}", self.error)
    }
}

impl<P> std::error::Error for PrepareError<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Shared parameter access for both lifecycle phases.
pub trait HasParameters: Send + 'static {
    type Parameters: Parameters;

    fn parameters(&self) -> &Self::Parameters;
}

/// Unprepared plugin.
pub trait Plugin: HasParameters + Sized {
    type Processor: AudioProcessor<Plugin = Self, Parameters = Self::Parameters>;

    /// Check the channel layout. The default accepts any layout.
    fn check_layout(&self, _layout: &BusLayout) -> Result<(), PluginError> {
        Ok(())
    }

    /// Build the prepared processor for `setup`.
    ///
    /// Must not allocate before the setup has been validated.
    fn build(self, setup: AudioSetup) -> Self::Processor;

    /// Validate `setup` and build the processor.
    ///
    /// On failure the plugin comes back unchanged inside the error.
    fn prepare(self, setup: AudioSetup) -> Result<Self::Processor, PrepareError<Self>> {
        let checked = setup
            .validate()
            .and_then(|()| self.check_layout(&setup.layout))
            .and_then(|()| self.parameters().validate().map_err(PluginError::from));

        match checked {
            Ok(()) => Ok(self.build(setup)),
            Err(error) => {
                warn!("Rejected audio setup {:?}: {}", setup, error);
                Err(PrepareError::new(self, error))
            }
        }
    }
}

/// Prepared processor.
///
/// [`process`](Self::process) runs in the audio context and must not
/// allocate, block, log or fail.
pub trait AudioProcessor: HasParameters {
    type Plugin: Plugin<Processor = Self, Parameters = Self::Parameters>;

    /// Configuration this processor was built for.
    fn setup(&self) -> &AudioSetup;

    /// Process one host block in place.
    fn process<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>);

    /// Clear all signal history (filters, envelopes, ramps).
    fn reset(&mut self);

    /// Serialize the parameter state.
    fn save_state(&self) -> Result<Vec<u8>, PluginError> {
        self.parameters().save_state()
    }

    /// Restore the parameter state.
    fn load_state(&mut self, data: &[u8]) -> Result<(), PluginError> {
        self.parameters().load_state(data)
    }

    /// Drop all stream state and return to the unprepared phase.
    fn unprepare(self) -> Self::Plugin
    where
        Self: Sized;
}
