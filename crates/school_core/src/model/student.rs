//! Student record and creation draft.
//!
//! # Invariants
//! - `group_id`, when set, references an existing group. Deleting that group
//!   clears the reference instead of deleting the student.

use super::group::GroupId;
use super::{require_assignable_id, require_positive_id, require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Stable student identity.
pub type StudentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// `None` means the student is not assigned to any group.
    pub group_id: Option<GroupId>,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn new(
        id: StudentId,
        group_id: Option<GroupId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            group_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_positive_id("student_id", self.id)?;
        validate_fields(self.group_id, &self.first_name, &self.last_name)
    }

    /// [`Student::validate`] plus the upper bound on caller-assigned ids.
    pub fn validate_assigned(&self) -> Result<(), ModelValidationError> {
        self.validate()?;
        require_assignable_id("student_id", self.id)
    }

    /// `first last` for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Student creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub id: Option<StudentId>,
    pub group_id: Option<GroupId>,
    pub first_name: String,
    pub last_name: String,
}

impl NewStudent {
    /// Draft whose identity is assigned by storage.
    pub fn new(
        group_id: Option<GroupId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            group_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Draft with a caller-assigned identity.
    pub fn with_id(
        id: StudentId,
        group_id: Option<GroupId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            group_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if let Some(id) = self.id {
            require_assignable_id("student_id", id)?;
        }
        validate_fields(self.group_id, &self.first_name, &self.last_name)
    }

    pub fn into_record(self, id: StudentId) -> Student {
        Student {
            id,
            group_id: self.group_id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

fn validate_fields(
    group_id: Option<GroupId>,
    first_name: &str,
    last_name: &str,
) -> Result<(), ModelValidationError> {
    if let Some(group_id) = group_id {
        require_positive_id("group_id", group_id)?;
    }
    require_text("first_name", first_name)?;
    require_text("last_name", last_name)
}
