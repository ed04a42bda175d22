//! # mbcomp-core
//!
//! Format-agnostic building blocks for real-time audio processors.
//!
//! Nothing in this crate knows about a particular plugin format or host. It
//! provides the pieces a processor is assembled from and the two-phase
//! lifecycle it runs under.
//!
//! ## Main Traits
//!
//! - [`Plugin`] - unprepared phase, owns the parameters
//! - [`AudioProcessor`] - prepared phase, owns the DSP state
//! - [`Parameters`] - type-erased parameter registry with state snapshots
//! - [`ParameterRef`] - type-erased single parameter
//!
//! ## Types
//!
//! - [`Buffer`] - in-place host block
//! - [`AudioBuffer`] - owned planar scratch buffer
//! - [`FloatParameter`], [`BoolParameter`], [`EnumParameter`] - atomic parameter cells
//! - [`Smoother`] - linear value ramps
//! - [`BypassHandler`] - bypass crossfade state machine
//! - [`PluginError`], [`ParameterError`] - control-path errors

pub mod buffer;
pub mod bypass;
pub mod error;
pub mod parameter_format;
pub mod parameter_groups;
pub mod parameter_info;
pub mod parameter_range;
pub mod parameter_store;
pub mod parameter_types;
pub mod plugin;
pub mod sample;
pub mod smoothing;
pub mod types;

pub use buffer::{AudioBuffer, Buffer};
pub use bypass::{BypassAction, BypassHandler, BypassState};
pub use error::{ParameterError, PluginError};
pub use parameter_format::Formatter;
pub use parameter_groups::{GroupId, GroupInfo, ParameterGroups, ROOT_GROUP_ID};
pub use parameter_info::{ParameterFlags, ParameterInfo};
pub use parameter_range::{LinearMapper, LogMapper, RangeMapper, SkewMapper};
pub use parameter_store::{ParameterSnapshot, Parameters, STATE_VERSION};
pub use parameter_types::{
    db_to_linear, linear_to_db, BoolParameter, EnumParameter, EnumParameterValue,
    FloatParameter, ParameterKind, ParameterRef,
};
pub use plugin::{AudioProcessor, AudioSetup, BusLayout, HasParameters, Plugin, PrepareError};
pub use sample::Sample;
pub use smoothing::{Smoother, SmoothingStyle};
pub use types::{ParameterId, ParameterValue, MAX_CHANNELS};
