//! Group record and creation draft.

use super::{require_assignable_id, require_positive_id, require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Stable group identity.
pub type GroupId = i64;

/// Persisted study group. Students point at a group, never the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Checks write-side invariants before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_positive_id("group_id", self.id)?;
        require_text("group_name", &self.name)
    }

    /// [`Group::validate`] plus the upper bound on caller-assigned ids.
    pub fn validate_assigned(&self) -> Result<(), ModelValidationError> {
        self.validate()?;
        require_assignable_id("group_id", self.id)
    }
}

/// Group creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    /// `None` lets storage assign the next id from the group sequence.
    pub id: Option<GroupId>,
    pub name: String,
}

impl NewGroup {
    /// Draft whose identity is assigned by storage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Draft with a caller-assigned identity.
    pub fn with_id(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if let Some(id) = self.id {
            require_assignable_id("group_id", id)?;
        }
        require_text("group_name", &self.name)
    }

    /// Builds the persisted record once the identity is known.
    pub fn into_record(self, id: GroupId) -> Group {
        Group { id, name: self.name }
    }
}
