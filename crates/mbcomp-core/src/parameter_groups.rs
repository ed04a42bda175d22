//! Parameter groups.
//!
//! Groups are flat folders a host or UI uses to present related parameters
//! together. The root group (ID 0) holds everything that is not grouped.

/// Group identifier.
pub type GroupId = i32;

/// ID of the implicit root group.
pub const ROOT_GROUP_ID: GroupId = 0;

/// A named group of parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: GroupId,
    /// Display name, e.g. "Low Band".
    pub name: &'static str,
    /// Parent group, [`ROOT_GROUP_ID`] for top-level groups.
    pub parent_id: GroupId,
}

impl GroupInfo {
    pub const fn new(id: GroupId, name: &'static str, parent_id: GroupId) -> Self {
        Self { id, name, parent_id }
    }

    pub const fn root() -> Self {
        Self::new(ROOT_GROUP_ID, "", ROOT_GROUP_ID)
    }
}

/// Enumeration of the groups a parameter collection uses.
///
/// Index 0 is always the root group.
pub trait ParameterGroups {
    /// Number of groups including the root.
    fn group_count(&self) -> usize {
        1
    }

    /// Group at `index`.
    fn group_info(&self, index: usize) -> Option<GroupInfo> {
        (index == 0).then(GroupInfo::root)
    }

    /// Find a group ID by display name.
    fn find_group_by_name(&self, name: &str) -> Option<GroupId> {
        (0..self.group_count())
            .filter_map(|i| self.group_info(i))
            .find(|info| info.name == name)
            .map(|info| info.id)
    }
}
