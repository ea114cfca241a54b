use std::sync::Arc;

use chrono::NaiveDate;
use coach_core::model::{CoachId, SessionDraft, SessionId, SessionPatch, TrainingSession};
use storage::repository::{CoachRepository, NewSessionRecord, SessionRepository, StorageError};

use crate::Clock;
use crate::error::SessionServiceError;

/// Records, edits and removes training sessions.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    coaches: Arc<dyn CoachRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        coaches: Arc<dyn CoachRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            coaches,
            sessions,
        }
    }

    /// The calendar date new sessions are checked against.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn ensure_coach(&self, coach_id: CoachId) -> Result<(), SessionServiceError> {
        match self.coaches.get_coach(coach_id).await? {
            Some(_) => Ok(()),
            None => Err(SessionServiceError::CoachNotFound(coach_id)),
        }
    }

    async fn load(&self, id: SessionId) -> Result<TrainingSession, SessionServiceError> {
        self.sessions
            .get_session(id)
            .await?
            .ok_or(SessionServiceError::SessionNotFound(id))
    }

    /// Validate a draft and record it for an active coach.
    ///
    /// Validation runs first; an invalid draft never reaches storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` for validation failures.
    /// Returns `SessionServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `SessionServiceError::Storage` if persistence fails.
    pub async fn create_session(
        &self,
        coach_id: CoachId,
        draft: SessionDraft,
    ) -> Result<TrainingSession, SessionServiceError> {
        let session = draft.validate(self.clock.today())?;
        let record = NewSessionRecord::new(coach_id, session, self.clock.now());
        match self.sessions.insert_session(record).await {
            Ok(session) => Ok(session),
            Err(StorageError::NotFound) => Err(SessionServiceError::CoachNotFound(coach_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// List a coach's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn list_sessions(
        &self,
        coach_id: CoachId,
    ) -> Result<Vec<TrainingSession>, SessionServiceError> {
        self.ensure_coach(coach_id).await?;
        Ok(self.sessions.list_sessions(coach_id).await?)
    }

    /// Fetch one session.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::SessionNotFound` if the session does not exist.
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn get_session(&self, id: SessionId) -> Result<TrainingSession, SessionServiceError> {
        self.load(id).await
    }

    /// Apply a partial update; changed fields are validated like a new session.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::SessionNotFound` if the session does not exist.
    /// Returns `SessionServiceError::Session` for validation failures.
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn update_session(
        &self,
        id: SessionId,
        patch: SessionPatch,
    ) -> Result<TrainingSession, SessionServiceError> {
        let current = self.load(id).await?;
        let updated = current.apply_patch(patch, self.clock.today(), self.clock.now())?;
        match self.sessions.update_session(&updated).await {
            Ok(()) => Ok(updated),
            Err(StorageError::NotFound) => Err(SessionServiceError::SessionNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Delete one session.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::SessionNotFound` if the session does not exist.
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn delete_session(&self, id: SessionId) -> Result<(), SessionServiceError> {
        match self.sessions.delete_session(id).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(SessionServiceError::SessionNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Delete every session of a coach and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn delete_all_sessions(&self, coach_id: CoachId) -> Result<u64, SessionServiceError> {
        self.ensure_coach(coach_id).await?;
        Ok(self.sessions.delete_sessions_for_coach(coach_id).await?)
    }
}
