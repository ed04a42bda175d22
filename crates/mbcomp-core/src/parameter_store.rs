//! The parameter registry seen by the control context.
//!
//! A parameter collection is a plain struct whose fields are typed parameters
//! ([`FloatParameter`], [`BoolParameter`], [`EnumParameter`](crate::EnumParameter)).
//! The signal chain reads those fields directly, so a misspelled binding does
//! not compile. The [`Parameters`] trait adds the type-erased view that
//! persistence, UI and host bridges need: iteration, lookup by ID or key,
//! typed lookup by key, validation and state snapshots.
//!
//! # Thread Safety
//!
//! Every method takes `&self`. Values live in atomic cells, so a collection
//! shared through an `Arc` can be written from the control context while the
//! audio context reads it.
//!
//! # State Format
//!
//! [`Parameters::save_state`] writes a JSON object keyed by parameter key with
//! plain values. Choice parameters store the index of the selected choice,
//! so `"Ratio_Low_Band": 4.0` is the fifth entry of the ratio list:
//!
//! ```json
//! { "version": 1, "parameters": { "Gain_in": -3.5, "Ratio_Low_Band": 4.0 } }
//! ```
//!
//! Keys a collection does not know are ignored on load, and parameters missing
//! from the blob keep their current value.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, PluginError};
use crate::parameter_groups::ParameterGroups;
use crate::parameter_types::{BoolParameter, FloatParameter, ParameterKind, ParameterRef};
use crate::types::{ParameterId, ParameterValue};

/// Current version written by [`Parameters::save_state`].
pub const STATE_VERSION: u32 = 1;

/// Plain values of a parameter collection, keyed by parameter key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl ParameterSnapshot {
    /// Plain value stored for `key`.
    pub fn get(&self, key: &str) -> Option<ParameterValue> {
        self.parameters.get(key).copied()
    }

    /// Store a plain value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: ParameterValue) {
        self.parameters.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Type-erased parameter collection.
///
/// Implementors provide [`count`](Self::count) and [`iter`](Self::iter); every
/// other method has a default built on those two.
///
/// ```ignore
/// impl Parameters for MyParameters {
///     fn count(&self) -> usize { 2 }
///
///     fn iter(&self) -> Box<dyn Iterator<Item = &dyn ParameterRef> + '_> {
///         Box::new([&self.gain as &dyn ParameterRef, &self.mute].into_iter())
///     }
/// }
/// ```
pub trait Parameters: ParameterGroups + Send + Sync {
    /// Number of parameters.
    fn count(&self) -> usize;

    /// All parameters in registration order.
    fn iter(&self) -> Box<dyn Iterator<Item = &dyn ParameterRef> + '_>;

    /// Find a parameter by ID.
    fn by_id(&self, id: ParameterId) -> Option<&dyn ParameterRef> {
        self.iter().find(|p| p.id() == id)
    }

    /// Find a parameter by key.
    fn by_key(&self, key: &str) -> Option<&dyn ParameterRef> {
        self.iter().find(|p| p.key() == key)
    }

    /// Find a parameter by key, failing on an unknown key.
    fn parameter(&self, key: &str) -> Result<&dyn ParameterRef, ParameterError> {
        self.by_key(key)
            .ok_or_else(|| ParameterError::UnknownKey(key.to_string()))
    }

    /// Find a float parameter by key.
    fn float_parameter(&self, key: &str) -> Result<&FloatParameter, ParameterError> {
        let parameter = self.parameter(key)?;
        parameter.as_float().ok_or_else(|| ParameterError::KindMismatch {
            key: key.to_string(),
            expected: ParameterKind::Float,
            actual: parameter.kind(),
        })
    }

    /// Find a boolean parameter by key.
    fn bool_parameter(&self, key: &str) -> Result<&BoolParameter, ParameterError> {
        let parameter = self.parameter(key)?;
        parameter.as_bool().ok_or_else(|| ParameterError::KindMismatch {
            key: key.to_string(),
            expected: ParameterKind::Bool,
            actual: parameter.kind(),
        })
    }

    /// Check that keys and IDs are unique.
    ///
    /// IDs are hashes of keys, so two distinct keys can still collide.
    fn validate(&self) -> Result<(), ParameterError> {
        let mut seen: HashMap<ParameterId, &'static str> = HashMap::with_capacity(self.count());
        for parameter in self.iter() {
            match seen.insert(parameter.id(), parameter.key()) {
                Some(previous) if previous == parameter.key() => {
                    return Err(ParameterError::DuplicateKey(previous.to_string()));
                }
                Some(previous) => {
                    return Err(ParameterError::DuplicateId {
                        id: parameter.id(),
                        first: previous.to_string(),
                        second: parameter.key().to_string(),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Set every parameter to its default.
    fn reset_to_defaults(&self) {
        for parameter in self.iter() {
            parameter.reset_to_default();
        }
    }

    /// Capture every current plain value.
    fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            version: STATE_VERSION,
            parameters: self
                .iter()
                .map(|p| (p.key().to_string(), p.get_plain()))
                .collect(),
        }
    }

    /// Apply a snapshot. Returns the number of parameters that were set.
    fn restore(&self, snapshot: &ParameterSnapshot) -> usize {
        let mut applied = 0;
        for (key, value) in &snapshot.parameters {
            if let Some(parameter) = self.by_key(key) {
                parameter.set_plain(*value);
                applied += 1;
            }
        }
        applied
    }

    /// Serialize all current values.
    fn save_state(&self) -> Result<Vec<u8>, PluginError> {
        let data = serde_json::to_vec(&self.snapshot())?;
        debug!("Saved {} parameters ({} bytes)", self.count(), data.len());
        Ok(data)
    }

    /// Restore values written by [`save_state`](Self::save_state).
    ///
    /// An empty blob is a no-op. A blob that does not parse leaves every
    /// parameter untouched.
    fn load_state(&self, data: &[u8]) -> Result<(), PluginError> {
        if data.is_empty() {
            return Ok(());
        }

        let snapshot: ParameterSnapshot = serde_json::from_slice(data)?;
        let applied = self.restore(&snapshot);
        debug!(
            "Loaded state version {}: {} of {} entries applied",
            snapshot.version,
            applied,
            snapshot.len()
        );
        Ok(())
    }
}
