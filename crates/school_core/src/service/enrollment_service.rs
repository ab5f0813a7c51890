//! Enrollment use-case service.
//!
//! # Invariants
//! - Enrolling requires both the student and the course to exist.
//! - A student is enrolled on a course at most once; a repeated enrollment is
//!   rejected instead of silently ignored.

use super::{confirm, Lookup, ServiceError, ServiceResult};
use crate::model::course::{Course, CourseId};
use crate::model::student::StudentId;
use crate::repo::course_repo::CourseRepository;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::AtomicScope;
use log::info;

/// Enrollment service facade over repository implementations.
pub struct EnrollmentService<S, C, E>
where
    S: StudentRepository,
    C: CourseRepository,
    E: EnrollmentRepository + AtomicScope,
{
    students: S,
    courses: C,
    enrollments: E,
}

impl<S, C, E> EnrollmentService<S, C, E>
where
    S: StudentRepository,
    C: CourseRepository,
    E: EnrollmentRepository + AtomicScope,
{
    pub fn new(students: S, courses: C, enrollments: E) -> Self {
        Self {
            students,
            courses,
            enrollments,
        }
    }

    /// Enrolls one student on one course.
    ///
    /// # Errors
    /// - `NotFound` when the student or the course does not exist.
    /// - `InvalidArgument` when the student is already enrolled.
    /// - `InconsistentState` when the enrollment is not visible afterwards.
    pub fn add_student_to_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<()> {
        self.enrollments.atomically("enrollment_add", || {
            self.ensure_both_exist(student_id, course_id)?;
            if self
                .enrollments
                .student_enrolled_on_course(student_id, course_id)?
            {
                return Err(ServiceError::invalid(format!(
                    "student {student_id} is already enrolled on course {course_id}"
                )));
            }

            confirm(
                self.enrollments.add_student_to_course(student_id, course_id)?,
                || format!("failed to enroll student {student_id} on course {course_id}"),
            )?;
            confirm(
                self.enrollments
                    .student_enrolled_on_course(student_id, course_id)?,
                || format!("student {student_id} is not enrolled on course {course_id} after add"),
            )
        })?;

        info!(
            "event=enrollment_add module=service status=ok student_id={student_id} course_id={course_id}"
        );
        Ok(())
    }

    /// Removes one student from one course.
    ///
    /// # Errors
    /// - `NotFound` when the student or the course does not exist.
    /// - `InvalidArgument` when the student is not enrolled on the course.
    pub fn remove_student_from_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<()> {
        self.enrollments.atomically("enrollment_remove", || {
            self.ensure_both_exist(student_id, course_id)?;
            if !self
                .enrollments
                .student_enrolled_on_course(student_id, course_id)?
            {
                return Err(ServiceError::invalid(format!(
                    "student {student_id} is not enrolled on course {course_id}"
                )));
            }

            confirm(
                self.enrollments
                    .remove_student_from_course(student_id, course_id)?,
                || format!("failed to remove student {student_id} from course {course_id}"),
            )?;
            confirm(
                !self
                    .enrollments
                    .student_enrolled_on_course(student_id, course_id)?,
                || format!("student {student_id} is still enrolled on course {course_id}"),
            )
        })?;

        info!(
            "event=enrollment_remove module=service status=ok student_id={student_id} course_id={course_id}"
        );
        Ok(())
    }

    pub fn student_enrolled_on_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<bool> {
        self.ensure_both_exist(student_id, course_id)?;
        Ok(self
            .enrollments
            .student_enrolled_on_course(student_id, course_id)?)
    }

    /// Courses the student is enrolled on, ordered by course id.
    pub fn courses_of_student(&self, student_id: StudentId) -> ServiceResult<Vec<Course>> {
        if !self.students.exists_by_id(student_id)? {
            return Err(ServiceError::NotFound(Lookup::Student(student_id)));
        }

        let mut courses = Vec::new();
        for course_id in self.enrollments.course_ids_for_student(student_id)? {
            let course = self.courses.get_by_id(course_id)?.ok_or_else(|| {
                ServiceError::inconsistent(format!(
                    "enrollment of student {student_id} references missing course {course_id}"
                ))
            })?;
            courses.push(course);
        }
        Ok(courses)
    }

    /// Clears every enrollment; students and courses stay.
    pub fn delete_all_enrollments(&self) -> ServiceResult<usize> {
        let deleted = self.enrollments.atomically("enrollment_delete_all", || {
            let deleted = self.enrollments.delete_all()?;
            confirm(self.enrollments.get_all()?.is_empty(), || {
                "enrollments remain after delete all".to_string()
            })?;
            Ok::<_, ServiceError>(deleted)
        })?;

        info!("event=enrollment_delete_all module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    fn ensure_both_exist(&self, student_id: StudentId, course_id: CourseId) -> ServiceResult<()> {
        if !self.students.exists_by_id(student_id)? {
            return Err(ServiceError::NotFound(Lookup::Student(student_id)));
        }
        if !self.courses.exists_by_id(course_id)? {
            return Err(ServiceError::NotFound(Lookup::Course(course_id)));
        }
        Ok(())
    }
}
