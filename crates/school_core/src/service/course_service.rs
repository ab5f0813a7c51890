//! Course use-case service.

use super::{confirm, non_empty, Lookup, ServiceError, ServiceResult};
use crate::model::course::{Course, CourseId, NewCourse};
use crate::repo::course_repo::CourseRepository;
use crate::repo::AtomicScope;
use log::info;

/// Course service facade over repository implementations.
pub struct CourseService<R: CourseRepository + AtomicScope> {
    repo: R,
}

impl<R: CourseRepository + AtomicScope> CourseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one course and returns it as read back from storage.
    pub fn create_course(&self, draft: NewCourse) -> ServiceResult<Course> {
        draft.validate().map_err(|err| ServiceError::invalid(err.to_string()))?;

        let course = self.repo.atomically("course_create", || {
            let id = match draft.id {
                Some(id) => {
                    if self.repo.exists_by_id(id)? {
                        return Err(ServiceError::invalid(format!(
                            "course id {id} is already used"
                        )));
                    }
                    confirm(self.repo.save(&draft.clone().into_record(id))?, || {
                        format!("course {id} was not created")
                    })?;
                    id
                }
                None => self
                    .repo
                    .save_without_id(&draft.name, &draft.description)?,
            };

            let stored = self.repo.get_by_id(id)?.ok_or_else(|| {
                ServiceError::inconsistent(format!("created course {id} not found in read-back"))
            })?;
            confirm(stored == draft.clone().into_record(id), || {
                format!("created course {id} differs from request")
            })?;
            Ok(stored)
        })?;

        info!(
            "event=course_create module=service status=ok course_id={}",
            course.id
        );
        Ok(course)
    }

    pub fn get_course(&self, id: CourseId) -> ServiceResult<Course> {
        self.repo
            .get_by_id(id)?
            .ok_or(ServiceError::NotFound(Lookup::Course(id)))
    }

    pub fn exists(&self, id: CourseId) -> ServiceResult<bool> {
        Ok(self.repo.exists_by_id(id)?)
    }

    /// Lists all courses. An empty store is reported as `NotFound`.
    pub fn get_all_courses(&self) -> ServiceResult<Vec<Course>> {
        non_empty(self.repo.get_all()?, || "courses".to_string())
    }

    pub fn get_all_ids(&self) -> ServiceResult<Vec<CourseId>> {
        Ok(self.repo.get_all_ids()?)
    }

    /// Courses named exactly `name`.
    pub fn find_courses_by_name(&self, name: &str) -> ServiceResult<Vec<Course>> {
        if name.trim().is_empty() {
            return Err(ServiceError::invalid("course name must not be blank"));
        }
        non_empty(self.repo.find_by_name(name)?, || {
            format!("courses named `{name}`")
        })
    }

    pub fn update_course(&self, course: &Course) -> ServiceResult<Course> {
        let updated = self.repo.atomically("course_update", || {
            if !self.repo.exists_by_id(course.id)? {
                return Err(ServiceError::NotFound(Lookup::Course(course.id)));
            }
            confirm(self.repo.update(course)?, || {
                format!("failed to update course {}", course.id)
            })?;

            let stored = self.repo.get_by_id(course.id)?;
            confirm(stored.as_ref() == Some(course), || {
                format!("course {} does not reflect the update", course.id)
            })?;
            Ok(course.clone())
        })?;

        info!(
            "event=course_update module=service status=ok course_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes one course together with its enrollments.
    pub fn delete_course(&self, id: CourseId) -> ServiceResult<()> {
        self.repo.atomically("course_delete", || {
            if !self.repo.exists_by_id(id)? {
                return Err(ServiceError::NotFound(Lookup::Course(id)));
            }
            confirm(self.repo.delete_by_id(id)?, || {
                format!("failed to delete course {id}")
            })?;
            confirm(!self.repo.exists_by_id(id)?, || {
                format!("course {id} still exists after delete")
            })
        })?;

        info!("event=course_delete module=service status=ok course_id={id}");
        Ok(())
    }

    pub fn delete_all_courses(&self) -> ServiceResult<usize> {
        let deleted = self.repo.atomically("course_delete_all", || {
            let deleted = self.repo.delete_all()?;
            confirm(self.repo.get_all()?.is_empty(), || {
                "courses remain after delete all".to_string()
            })?;
            Ok::<_, ServiceError>(deleted)
        })?;

        info!("event=course_delete_all module=service status=ok deleted={deleted}");
        Ok(deleted)
    }
}
