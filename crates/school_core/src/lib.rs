//! School records core: groups, courses, students and enrollments on SQLite.
//! This crate owns every referential-integrity rule; front ends only talk to
//! the service layer.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{Course, CourseId, NewCourse};
pub use model::enrollment::Enrollment;
pub use model::group::{Group, GroupId, NewGroup};
pub use model::student::{NewStudent, Student, StudentId};
pub use model::{ModelValidationError, MAX_ASSIGNED_ID};
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::school_repo::{SchoolCounts, SchoolRepository, SqliteSchoolRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{AtomicScope, RepoError, RepoResult};
pub use service::course_service::CourseService;
pub use service::enrollment_service::EnrollmentService;
pub use service::group_service::GroupService;
pub use service::seed_service::{SeedPlan, SeedReport, SeedService};
pub use service::student_service::StudentService;
pub use service::{ErrorKind, Lookup, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
