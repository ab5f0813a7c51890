//! Course record and creation draft.
//!
//! Course names are not unique, but they are the lookup key for the
//! "students by course name" query.

use super::{require_assignable_id, require_positive_id, require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Stable course identity.
pub type CourseId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Free text; may be empty.
    pub description: String,
}

impl Course {
    pub fn new(id: CourseId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_positive_id("course_id", self.id)?;
        require_text("course_name", &self.name)
    }

    /// [`Course::validate`] plus the upper bound on caller-assigned ids.
    pub fn validate_assigned(&self) -> Result<(), ModelValidationError> {
        self.validate()?;
        require_assignable_id("course_id", self.id)
    }
}

/// Course creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub id: Option<CourseId>,
    pub name: String,
    pub description: String,
}

impl NewCourse {
    /// Draft whose identity is assigned by storage.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Draft with a caller-assigned identity.
    pub fn with_id(id: CourseId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if let Some(id) = self.id {
            require_assignable_id("course_id", id)?;
        }
        require_text("course_name", &self.name)
    }

    pub fn into_record(self, id: CourseId) -> Course {
        Course {
            id,
            name: self.name,
            description: self.description,
        }
    }
}
