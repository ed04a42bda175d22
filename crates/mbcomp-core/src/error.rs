//! Error types for configuration, state and parameter lookup.
//!
//! Only control-path operations return these. Audio processing is infallible.

use thiserror::Error;

use crate::parameter_types::ParameterKind;
use crate::types::{ParameterId, MAX_CHANNELS};

/// Errors from looking up or validating parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    /// No parameter is registered under this key
    #[error("Unknown parameter '{0}'")]
    UnknownKey(String),

    /// The parameter exists but holds a different kind of value
    #[error("Parameter '{key}' is {actual:?}, expected {expected:?}")]
    KindMismatch {
        key: String,
        expected: ParameterKind,
        actual: ParameterKind,
    },

    /// Two keys hash to the same ID
    #[error("Parameters '{first}' and '{second}' share ID {id:#010x}")]
    DuplicateId {
        id: ParameterId,
        first: String,
        second: String,
    },

    /// The same key is registered twice
    #[error("Parameter key '{0}' is registered more than once")]
    DuplicateKey(String),
}

/// Errors from preparing a processor or restoring its state.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Sample rate not finite and positive
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Maximum block size of zero
    #[error("Maximum block size must be at least one sample")]
    InvalidBlockSize,

    /// Channel layout other than matching mono or stereo
    #[error("Unsupported channel layout: {input} in, {output} out (mono or stereo, input matching output)")]
    UnsupportedLayout { input: usize, output: usize },

    /// More channels than a buffer can carry
    #[error("{0} channels exceed the maximum of {MAX_CHANNELS}")]
    TooManyChannels(usize),

    /// Parameter set failed validation
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// State blob could not be written or read
    #[error("State error: {0}")]
    State(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ParameterError::UnknownKey("Attack_Top_Band".into());
        assert_eq!(err.to_string(), "Unknown parameter 'Attack_Top_Band'");

        let err = PluginError::UnsupportedLayout { input: 1, output: 2 };
        assert!(err.to_string().starts_with("Unsupported channel layout: 1 in, 2 out"));
    }

    #[test]
    fn parameter_errors_convert() {
        let err: PluginError = ParameterError::DuplicateKey("Gain_in".into()).into();
        assert!(matches!(err, PluginError::Parameter(ParameterError::DuplicateKey(_))));
    }

    #[test]
    fn json_errors_convert() {
        let err: PluginError = serde_json::from_slice::<serde_json::Value>(b"{")
            .unwrap_err()
            .into();
        assert!(matches!(err, PluginError::State(_)));
    }
}
