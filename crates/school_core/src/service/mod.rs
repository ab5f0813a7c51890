//! Core use-case services.
//!
//! # Responsibility
//! - Turn repository `Option`/`bool` answers into a fail-fast API.
//! - Keep UI layers decoupled from storage details; the console front end
//!   talks to services only.
//!
//! # Invariants
//! - Mutations follow: existence pre-check (`NotFound`), business rule check
//!   (`InvalidArgument`), delegate, post-check (`InconsistentState`).
//! - Multi-step mutations run inside one `AtomicScope`.
//! - Bulk listings report an empty result as `NotFound`.

use crate::model::course::CourseId;
use crate::model::group::GroupId;
use crate::model::student::StudentId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course_service;
pub mod enrollment_service;
pub mod group_service;
pub mod seed_service;
pub mod student_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Group(GroupId),
    Course(CourseId),
    Student(StudentId),
    /// A listing or filter query matched nothing.
    NoMatches(String),
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group not found: {id}"),
            Self::Course(id) => write!(f, "course not found: {id}"),
            Self::Student(id) => write!(f, "student not found: {id}"),
            Self::NoMatches(what) => write!(f, "no {what} found"),
        }
    }
}

/// Coarse error taxonomy used by front ends to pick user guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InconsistentState,
    StorageUnavailable,
}

/// Service error for school use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced entity is absent, or a listing matched nothing.
    NotFound(Lookup),
    /// Caller violated a business rule.
    InvalidArgument(String),
    /// The operation's own effect could not be confirmed afterwards.
    InconsistentState(String),
    /// Storage-level failure.
    StorageUnavailable(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InconsistentState(_) => ErrorKind::InconsistentState,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
        }
    }

    pub(crate) fn no_matches(what: impl Into<String>) -> Self {
        Self::NotFound(Lookup::NoMatches(what.into()))
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState(message.into())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(lookup) => write!(f, "{lookup}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InconsistentState(message) => write!(f, "inconsistent state: {message}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidArgument(err.to_string()),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Fails with `InconsistentState` unless `holds`.
pub(crate) fn confirm(holds: bool, message: impl FnOnce() -> String) -> ServiceResult<()> {
    if holds {
        Ok(())
    } else {
        Err(ServiceError::InconsistentState(message()))
    }
}

/// Fails with `NotFound` when `items` is empty.
pub(crate) fn non_empty<T>(items: Vec<T>, what: impl FnOnce() -> String) -> ServiceResult<Vec<T>> {
    if items.is_empty() {
        return Err(ServiceError::no_matches(what()));
    }
    Ok(items)
}
