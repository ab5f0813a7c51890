//! Group use-case service.
//!
//! # Invariants
//! - Deleting a group never deletes students; members end up without group.
//! - Student-count threshold must be `>= 0`.

use super::{confirm, non_empty, Lookup, ServiceError, ServiceResult};
use crate::model::group::{Group, GroupId, NewGroup};
use crate::repo::group_repo::GroupRepository;
use crate::repo::AtomicScope;
use log::info;

/// Group service facade over repository implementations.
pub struct GroupService<R: GroupRepository + AtomicScope> {
    repo: R,
}

impl<R: GroupRepository + AtomicScope> GroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one group and returns it as read back from storage.
    ///
    /// # Errors
    /// - `InvalidArgument` when the name is blank or the caller-assigned id
    ///   is already used.
    pub fn create_group(&self, draft: NewGroup) -> ServiceResult<Group> {
        draft.validate().map_err(|err| ServiceError::invalid(err.to_string()))?;

        let group = self.repo.atomically("group_create", || {
            let id = match draft.id {
                Some(id) => {
                    if self.repo.exists_by_id(id)? {
                        return Err(ServiceError::invalid(format!(
                            "group id {id} is already used"
                        )));
                    }
                    let record = draft.clone().into_record(id);
                    confirm(self.repo.save(&record)?, || {
                        format!("group {id} was not created")
                    })?;
                    id
                }
                None => self.repo.save_without_id(&draft.name)?,
            };

            let stored = self.repo.get_by_id(id)?.ok_or_else(|| {
                ServiceError::inconsistent(format!("created group {id} not found in read-back"))
            })?;
            confirm(stored == draft.clone().into_record(id), || {
                format!("created group {id} differs from request")
            })?;
            Ok(stored)
        })?;

        info!(
            "event=group_create module=service status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    pub fn get_group(&self, id: GroupId) -> ServiceResult<Group> {
        self.repo
            .get_by_id(id)?
            .ok_or(ServiceError::NotFound(Lookup::Group(id)))
    }

    pub fn exists(&self, id: GroupId) -> ServiceResult<bool> {
        Ok(self.repo.exists_by_id(id)?)
    }

    /// Lists all groups. An empty store is reported as `NotFound`.
    pub fn get_all_groups(&self) -> ServiceResult<Vec<Group>> {
        non_empty(self.repo.get_all()?, || "groups".to_string())
    }

    pub fn get_all_ids(&self) -> ServiceResult<Vec<GroupId>> {
        Ok(self.repo.get_all_ids()?)
    }

    /// Replaces the group name and returns the stored record.
    pub fn update_group(&self, group: &Group) -> ServiceResult<Group> {
        let updated = self.repo.atomically("group_update", || {
            if !self.repo.exists_by_id(group.id)? {
                return Err(ServiceError::NotFound(Lookup::Group(group.id)));
            }
            confirm(self.repo.update(group)?, || {
                format!("failed to update group {}", group.id)
            })?;

            let stored = self.repo.get_by_id(group.id)?;
            confirm(stored.as_ref() == Some(group), || {
                format!("group {} does not reflect the update", group.id)
            })?;
            Ok(group.clone())
        })?;

        info!(
            "event=group_update module=service status=ok group_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes one group; its students keep existing without a group.
    pub fn delete_group(&self, id: GroupId) -> ServiceResult<()> {
        self.repo.atomically("group_delete", || {
            if !self.repo.exists_by_id(id)? {
                return Err(ServiceError::NotFound(Lookup::Group(id)));
            }
            confirm(self.repo.delete_by_id(id)?, || {
                format!("failed to delete group {id}")
            })?;
            confirm(!self.repo.exists_by_id(id)?, || {
                format!("group {id} still exists after delete")
            })
        })?;

        info!("event=group_delete module=service status=ok group_id={id}");
        Ok(())
    }

    /// Deletes every group and returns how many were removed.
    pub fn delete_all_groups(&self) -> ServiceResult<usize> {
        let deleted = self.repo.atomically("group_delete_all", || {
            let deleted = self.repo.delete_all()?;
            confirm(self.repo.get_all()?.is_empty(), || {
                "groups remain after delete all".to_string()
            })?;
            Ok::<_, ServiceError>(deleted)
        })?;

        info!("event=group_delete_all module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    /// Groups with at most `student_count` members.
    ///
    /// # Errors
    /// - `InvalidArgument` when `student_count < 0`.
    /// - `NotFound` when no group qualifies.
    pub fn find_all_groups_with_less_or_equal_student_count(
        &self,
        student_count: i64,
    ) -> ServiceResult<Vec<Group>> {
        if student_count < 0 {
            return Err(ServiceError::invalid(format!(
                "student count can not be less than 0, got {student_count}"
            )));
        }

        non_empty(
            self.repo.find_with_student_count_at_most(student_count)?,
            || format!("groups with less or equal student count {student_count}"),
        )
    }
}
