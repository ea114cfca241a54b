use std::sync::Arc;

use coach_core::model::{Coach, CoachDraft, CoachId, CoachPatch};
use storage::repository::{CoachRepository, NewCoachRecord, StorageError};

use crate::Clock;
use crate::error::CoachServiceError;

/// Orchestrates coach creation, edits and soft deletion.
#[derive(Clone)]
pub struct CoachService {
    clock: Clock,
    coaches: Arc<dyn CoachRepository>,
}

impl CoachService {
    #[must_use]
    pub fn new(clock: Clock, coaches: Arc<dyn CoachRepository>) -> Self {
        Self { clock, coaches }
    }

    /// Validate and persist a new coach.
    ///
    /// # Errors
    ///
    /// Returns `CoachServiceError::Coach` for validation failures.
    /// Returns `CoachServiceError::DuplicateName` if an active coach has the name.
    /// Returns `CoachServiceError::Storage` if persistence fails.
    pub async fn create_coach(&self, draft: CoachDraft) -> Result<Coach, CoachServiceError> {
        let coach = draft.validate()?;
        let name = coach.name.to_string();
        self.coaches
            .insert_coach(NewCoachRecord::new(coach, self.clock.now()))
            .await
            .map_err(|e| match e {
                StorageError::Conflict => CoachServiceError::DuplicateName(name),
                other => other.into(),
            })
    }

    /// List active coaches ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `CoachServiceError::Storage` if repository access fails.
    pub async fn list_coaches(&self) -> Result<Vec<Coach>, CoachServiceError> {
        Ok(self.coaches.list_active_coaches().await?)
    }

    /// Fetch an active coach.
    ///
    /// # Errors
    ///
    /// Returns `CoachServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `CoachServiceError::Storage` if repository access fails.
    pub async fn get_coach(&self, id: CoachId) -> Result<Coach, CoachServiceError> {
        self.coaches
            .get_coach(id)
            .await?
            .ok_or(CoachServiceError::CoachNotFound(id))
    }

    /// Apply a partial update to an active coach.
    ///
    /// # Errors
    ///
    /// Returns `CoachServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `CoachServiceError::Coach` if a changed field is invalid.
    /// Returns `CoachServiceError::DuplicateName` if the new name is taken.
    /// Returns `CoachServiceError::Storage` if repository access fails.
    pub async fn update_coach(
        &self,
        id: CoachId,
        patch: CoachPatch,
    ) -> Result<Coach, CoachServiceError> {
        let current = self.get_coach(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = current.apply_patch(patch, self.clock.now())?;
        match self.coaches.update_coach(&updated).await {
            Ok(()) => Ok(updated),
            Err(StorageError::Conflict) => Err(CoachServiceError::DuplicateName(
                updated.name().to_string(),
            )),
            Err(StorageError::NotFound) => Err(CoachServiceError::CoachNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Soft-delete a coach. Its sessions are kept but become unreachable.
    ///
    /// # Errors
    ///
    /// Returns `CoachServiceError::CoachNotFound` if the coach is missing or already deleted.
    /// Returns `CoachServiceError::Storage` if repository access fails.
    pub async fn delete_coach(&self, id: CoachId) -> Result<(), CoachServiceError> {
        match self.coaches.deactivate_coach(id, self.clock.now()).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(CoachServiceError::CoachNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }
}
