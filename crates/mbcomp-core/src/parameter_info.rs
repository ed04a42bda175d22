//! Parameter metadata.

use crate::parameter_groups::{GroupId, ROOT_GROUP_ID};
use crate::types::{ParameterId, ParameterValue};

/// Behavioral flags of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterFlags {
    /// Host may automate the parameter.
    pub can_automate: bool,
    /// Parameter is a bypass switch.
    pub is_bypass: bool,
    /// Parameter is a list of labelled choices.
    pub is_list: bool,
}

impl ParameterFlags {
    pub const DEFAULT: Self = Self {
        can_automate: true,
        is_bypass: false,
        is_list: false,
    };
}

impl Default for ParameterFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// FNV-1a hash of `key`.
    pub id: ParameterId,
    /// Stable string key used for lookup and persistence (e.g. "Attack_Low_Band").
    pub key: &'static str,
    /// Display name (e.g. "Attack Low Band").
    pub name: &'static str,
    /// Short display name for narrow controls.
    pub short_name: &'static str,
    /// Unit label (e.g. "dB", "Hz").
    pub units: &'static str,
    /// Default value, normalized.
    pub default_normalized: ParameterValue,
    /// 0 = continuous, 1 = toggle, >1 = number of discrete steps.
    pub step_count: i32,
    pub flags: ParameterFlags,
    pub group_id: GroupId,
}

impl ParameterInfo {
    /// Continuous, automatable parameter in the root group.
    pub const fn new(id: ParameterId, key: &'static str, name: &'static str) -> Self {
        Self {
            id,
            key,
            name,
            short_name: name,
            units: "",
            default_normalized: 0.0,
            step_count: 0,
            flags: ParameterFlags::DEFAULT,
            group_id: ROOT_GROUP_ID,
        }
    }

    pub const fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.short_name = short_name;
        self
    }

    pub const fn with_units(mut self, units: &'static str) -> Self {
        self.units = units;
        self
    }

    pub const fn with_default(mut self, default: ParameterValue) -> Self {
        self.default_normalized = default;
        self
    }

    pub const fn with_steps(mut self, steps: i32) -> Self {
        self.step_count = steps;
        self
    }

    pub const fn with_flags(mut self, flags: ParameterFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = group_id;
        self
    }
}
