//! Student use-case service.
//!
//! # Responsibility
//! - Student create/update/delete with group reference checks.
//! - "Students by course name" and group membership queries.
//!
//! # Invariants
//! - A student is only written when its group reference exists.
//! - A caller-assigned id must not collide with an existing student.

use super::{confirm, non_empty, Lookup, ServiceError, ServiceResult};
use crate::model::group::GroupId;
use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::group_repo::GroupRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::AtomicScope;
use log::info;

/// Student service facade over repository implementations.
pub struct StudentService<S, G>
where
    S: StudentRepository + AtomicScope,
    G: GroupRepository,
{
    students: S,
    groups: G,
}

impl<S, G> StudentService<S, G>
where
    S: StudentRepository + AtomicScope,
    G: GroupRepository,
{
    pub fn new(students: S, groups: G) -> Self {
        Self { students, groups }
    }

    /// Creates one student and returns it as read back from storage.
    ///
    /// # Errors
    /// - `NotFound` when the referenced group does not exist.
    /// - `InvalidArgument` when a field is blank or the caller-assigned id
    ///   is already used.
    pub fn create_student(&self, draft: NewStudent) -> ServiceResult<Student> {
        draft.validate().map_err(|err| ServiceError::invalid(err.to_string()))?;

        let student = self.students.atomically("student_create", || {
            self.ensure_group_exists(draft.group_id)?;

            let id = match draft.id {
                Some(id) => {
                    if self.students.exists_by_id(id)? {
                        return Err(ServiceError::invalid(format!(
                            "student id {id} is already used"
                        )));
                    }
                    confirm(self.students.save(&draft.clone().into_record(id))?, || {
                        format!("student {id} was not created")
                    })?;
                    id
                }
                None => self
                    .students
                    .save_without_id(draft.group_id, &draft.first_name, &draft.last_name)?
                    .ok_or_else(|| ServiceError::inconsistent("student was not created"))?,
            };

            let stored = self.students.get_by_id(id)?.ok_or_else(|| {
                ServiceError::inconsistent(format!("created student {id} not found in read-back"))
            })?;
            confirm(stored == draft.clone().into_record(id), || {
                format!("created student {id} differs from request")
            })?;
            Ok(stored)
        })?;

        info!(
            "event=student_create module=service status=ok student_id={} group_id={:?}",
            student.id, student.group_id
        );
        Ok(student)
    }

    pub fn get_student(&self, id: StudentId) -> ServiceResult<Student> {
        self.students
            .get_by_id(id)?
            .ok_or(ServiceError::NotFound(Lookup::Student(id)))
    }

    pub fn exists(&self, id: StudentId) -> ServiceResult<bool> {
        Ok(self.students.exists_by_id(id)?)
    }

    /// Lists all students. An empty store is reported as `NotFound`.
    pub fn get_all_students(&self) -> ServiceResult<Vec<Student>> {
        non_empty(self.students.get_all()?, || "students".to_string())
    }

    pub fn get_all_ids(&self) -> ServiceResult<Vec<StudentId>> {
        Ok(self.students.get_all_ids()?)
    }

    /// Replaces group reference and names; the id is immutable.
    pub fn update_student(&self, student: &Student) -> ServiceResult<Student> {
        let updated = self.students.atomically("student_update", || {
            if !self.students.exists_by_id(student.id)? {
                return Err(ServiceError::NotFound(Lookup::Student(student.id)));
            }
            self.ensure_group_exists(student.group_id)?;

            confirm(self.students.update(student)?, || {
                format!("failed to update student {}", student.id)
            })?;
            let stored = self.students.get_by_id(student.id)?;
            confirm(stored.as_ref() == Some(student), || {
                format!("student {} does not reflect the update", student.id)
            })?;
            Ok(student.clone())
        })?;

        info!(
            "event=student_update module=service status=ok student_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes one student together with its enrollments.
    pub fn delete_student(&self, id: StudentId) -> ServiceResult<()> {
        self.students.atomically("student_delete", || {
            if !self.students.exists_by_id(id)? {
                return Err(ServiceError::NotFound(Lookup::Student(id)));
            }
            confirm(self.students.delete_by_id(id)?, || {
                format!("failed to delete student {id}")
            })?;
            confirm(!self.students.exists_by_id(id)?, || {
                format!("student {id} still exists after delete")
            })
        })?;

        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(())
    }

    pub fn delete_all_students(&self) -> ServiceResult<usize> {
        let deleted = self.students.atomically("student_delete_all", || {
            let deleted = self.students.delete_all()?;
            confirm(self.students.get_all()?.is_empty(), || {
                "students remain after delete all".to_string()
            })?;
            Ok::<_, ServiceError>(deleted)
        })?;

        info!("event=student_delete_all module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    /// Students enrolled on a course named exactly `course_name`.
    ///
    /// # Errors
    /// - `InvalidArgument` when the name is blank.
    /// - `NotFound` when nobody is enrolled on such a course.
    pub fn find_all_students_by_course_name(&self, course_name: &str) -> ServiceResult<Vec<Student>> {
        if course_name.trim().is_empty() {
            return Err(ServiceError::invalid("course name must not be blank"));
        }
        non_empty(self.students.find_by_course_name(course_name)?, || {
            format!("students on course `{course_name}`")
        })
    }

    /// Members of one group; an existing group without members yields `[]`.
    pub fn get_group_members(&self, group_id: GroupId) -> ServiceResult<Vec<Student>> {
        self.ensure_group_exists(Some(group_id))?;
        Ok(self.students.find_by_group(group_id)?)
    }

    fn ensure_group_exists(&self, group_id: Option<GroupId>) -> ServiceResult<()> {
        match group_id {
            Some(group_id) if !self.groups.exists_by_id(group_id)? => {
                Err(ServiceError::NotFound(Lookup::Group(group_id)))
            }
            _ => Ok(()),
        }
    }
}
