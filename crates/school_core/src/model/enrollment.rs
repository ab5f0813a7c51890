//! Student-to-course association.

use super::course::CourseId;
use super::student::StudentId;
use serde::{Deserialize, Serialize};

/// One `(student, course)` membership pair. A pair is stored at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

impl Enrollment {
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
        }
    }
}
