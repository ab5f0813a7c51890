//! School records domain model.
//!
//! # Responsibility
//! - Define persisted records for groups, courses, students and enrollments.
//! - Define creation drafts that make the identity mode explicit.
//! - Provide write-side validation shared by repositories and services.
//!
//! # Invariants
//! - Persisted records always carry a positive id.
//! - Caller-assigned ids stay at or below [`MAX_ASSIGNED_ID`] so the id
//!   sequence always has room for store-assigned ids.
//! - A draft with `id = None` asks storage to assign the identity.
//! - Display fields (names) are never blank.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course;
pub mod enrollment;
pub mod group;
pub mod student;

/// Largest id a caller may assign on creation. Store-assigned ids continue
/// from the highest stored id, so this leaves them the upper half of `i64`.
pub const MAX_ASSIGNED_ID: i64 = i64::MAX / 2;

/// Validation failure for school records and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Identity value is zero or negative.
    NonPositiveId { field: &'static str, value: i64 },
    /// Caller-assigned identity is above [`MAX_ASSIGNED_ID`].
    IdAboveLimit { field: &'static str, value: i64 },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NonPositiveId { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::IdAboveLimit { field, value } => {
                write!(f, "{field} must be at most {MAX_ASSIGNED_ID}, got {value}")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_positive_id(field: &'static str, value: i64) -> Result<(), ModelValidationError> {
    if value <= 0 {
        return Err(ModelValidationError::NonPositiveId { field, value });
    }
    Ok(())
}

pub(crate) fn require_assignable_id(
    field: &'static str,
    value: i64,
) -> Result<(), ModelValidationError> {
    require_positive_id(field, value)?;
    if value > MAX_ASSIGNED_ID {
        return Err(ModelValidationError::IdAboveLimit { field, value });
    }
    Ok(())
}
