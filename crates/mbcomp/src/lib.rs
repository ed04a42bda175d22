//! # mbcomp
//!
//! Three-band compressor. The signal is split by a phase-compensated
//! Linkwitz-Riley crossover, each band runs through its own compressor, and
//! the bands are summed back with solo/mute routing. Ramped trim gains sit
//! before the split and after the sum.
//!
//! ```ignore
//! use mbcomp::prelude::*;
//!
//! let plugin = MultibandCompressor::new();
//! let parameters = plugin.parameters_handle();
//! let mut processor = plugin.prepare(AudioSetup::new(48_000.0, 512, BusLayout::stereo()))?;
//!
//! parameters.band(Band::Low).threshold.set(-24.0);
//! processor.process(&mut buffer);
//! ```

pub mod band;
pub mod compressor;
pub mod crossover;
pub mod gain;
pub mod mixer;
pub mod parameters;
pub mod processor;

pub use band::{Band, BandKeys};
pub use compressor::{CompressorBand, CompressorSettings, GainReductionMeter};
pub use crossover::{FilterType, LinkwitzRileyFilter, ThreeBandCrossover};
pub use gain::GainStage;
pub use mixer::{audible_bands, recombine, BandRouting};
pub use parameters::{BandParameters, MultibandParameters, Ratio};
pub use processor::{BandMeters, MultibandCompressor, MultibandProcessor};

pub use mbcomp_macros::EnumParameter;

/// Everything needed to host the compressor.
pub mod prelude {
    pub use crate::{Band, MultibandCompressor, MultibandParameters, MultibandProcessor, Ratio};
    pub use mbcomp_core::{
        AudioProcessor, AudioSetup, Buffer, BusLayout, EnumParameterValue, HasParameters,
        ParameterRef, Parameters, Plugin, PluginError,
    };
}
