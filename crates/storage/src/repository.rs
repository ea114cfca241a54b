use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coach_core::model::{
    Coach, CoachId, NewCoach, NewSession, SessionId, TrainingSession,
};
use coach_core::progress::{HourTotal, totals_from_sessions};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert shape for a validated coach.
#[derive(Debug, Clone)]
pub struct NewCoachRecord {
    pub coach: NewCoach,
    pub created_at: DateTime<Utc>,
}

impl NewCoachRecord {
    #[must_use]
    pub fn new(coach: NewCoach, created_at: DateTime<Utc>) -> Self {
        Self { coach, created_at }
    }
}

/// Insert shape for a validated session owned by `coach_id`.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub coach_id: CoachId,
    pub session: NewSession,
    pub created_at: DateTime<Utc>,
}

impl NewSessionRecord {
    #[must_use]
    pub fn new(coach_id: CoachId, session: NewSession, created_at: DateTime<Utc>) -> Self {
        Self {
            coach_id,
            session,
            created_at,
        }
    }
}

/// Repository contract for coaches.
///
/// Deleted coaches are kept as inactive rows and are invisible to every read.
#[async_trait]
pub trait CoachRepository: Send + Sync {
    /// Persist a new active coach and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if an active coach already has the name.
    async fn insert_coach(&self, coach: NewCoachRecord) -> Result<Coach, StorageError>;

    /// Fetch an active coach by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_coach(&self, id: CoachId) -> Result<Option<Coach>, StorageError>;

    /// List active coaches ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_active_coaches(&self) -> Result<Vec<Coach>, StorageError>;

    /// Overwrite name, contact details and `updated_at` of an active coach.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the coach is missing or inactive,
    /// `StorageError::Conflict` if another active coach has the name.
    async fn update_coach(&self, coach: &Coach) -> Result<(), StorageError>;

    /// Mark a coach inactive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the coach is missing or already inactive.
    async fn deactivate_coach(&self, id: CoachId, at: DateTime<Utc>) -> Result<(), StorageError>;
}

/// Repository contract for training sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a session for an active coach.
    ///
    /// The coach check and the insert happen atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the coach is missing or inactive.
    async fn insert_session(
        &self,
        session: NewSessionRecord,
    ) -> Result<TrainingSession, StorageError>;

    /// Fetch a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_session(&self, id: SessionId) -> Result<Option<TrainingSession>, StorageError>;

    /// List a coach's sessions, newest date first, then newest creation first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_sessions(&self, coach_id: CoachId)
    -> Result<Vec<TrainingSession>, StorageError>;

    /// Overwrite the mutable fields of a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn update_session(&self, session: &TrainingSession) -> Result<(), StorageError>;

    /// Delete one session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError>;

    /// Delete every session of a coach, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_sessions_for_coach(&self, coach_id: CoachId) -> Result<u64, StorageError>;

    /// Sum a coach's half hours per (equipment, type).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn hour_totals(&self, coach_id: CoachId) -> Result<Vec<HourTotal>, StorageError>;
}

/// Liveness probe for the backing store.
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store cannot answer.
    async fn ping(&self) -> Result<(), StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    coaches: BTreeMap<CoachId, Coach>,
    sessions: BTreeMap<SessionId, TrainingSession>,
    next_coach_id: u64,
    next_session_id: u64,
}

impl InMemoryState {
    fn active_coach(&self, id: CoachId) -> Option<&Coach> {
        self.coaches.get(&id).filter(|c| c.is_active())
    }

    fn name_taken(&self, name: &str, except: Option<CoachId>) -> bool {
        self.coaches.values().any(|c| {
            c.is_active() && c.name().as_str() == name && Some(c.id()) != except
        })
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CoachRepository for InMemoryRepository {
    async fn insert_coach(&self, record: NewCoachRecord) -> Result<Coach, StorageError> {
        let mut guard = self.lock()?;
        if guard.name_taken(record.coach.name.as_str(), None) {
            return Err(StorageError::Conflict);
        }
        guard.next_coach_id += 1;
        let coach = Coach::from_new(
            CoachId::new(guard.next_coach_id),
            record.coach,
            record.created_at,
        );
        guard.coaches.insert(coach.id(), coach.clone());
        Ok(coach)
    }

    async fn get_coach(&self, id: CoachId) -> Result<Option<Coach>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.active_coach(id).cloned())
    }

    async fn list_active_coaches(&self) -> Result<Vec<Coach>, StorageError> {
        let guard = self.lock()?;
        let mut coaches: Vec<Coach> = guard
            .coaches
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        coaches.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(coaches)
    }

    async fn update_coach(&self, coach: &Coach) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.active_coach(coach.id()).is_none() {
            return Err(StorageError::NotFound);
        }
        if guard.name_taken(coach.name().as_str(), Some(coach.id())) {
            return Err(StorageError::Conflict);
        }
        guard.coaches.insert(coach.id(), coach.clone());
        Ok(())
    }

    async fn deactivate_coach(&self, id: CoachId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let coach = guard.active_coach(id).ok_or(StorageError::NotFound)?;
        let inactive = Coach::from_persisted(
            coach.id(),
            coach.name().as_str().to_owned(),
            coach.email().map(str::to_owned),
            coach.phone().map(str::to_owned),
            false,
            coach.created_at(),
            at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.coaches.insert(id, inactive);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(
        &self,
        record: NewSessionRecord,
    ) -> Result<TrainingSession, StorageError> {
        let mut guard = self.lock()?;
        if guard.active_coach(record.coach_id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.next_session_id += 1;
        let session = TrainingSession::from_new(
            SessionId::new(guard.next_session_id),
            record.coach_id,
            record.session,
            record.created_at,
        );
        guard.sessions.insert(session.id(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<TrainingSession>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.sessions.get(&id).cloned())
    }

    async fn list_sessions(
        &self,
        coach_id: CoachId,
    ) -> Result<Vec<TrainingSession>, StorageError> {
        let guard = self.lock()?;
        let mut sessions: Vec<TrainingSession> = guard
            .sessions
            .values()
            .filter(|s| s.coach_id() == coach_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| b.created_at().cmp(&a.created_at()))
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(sessions)
    }

    async fn update_session(&self, session: &TrainingSession) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.sessions.get_mut(&session.id()) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn delete_sessions_for_coach(&self, coach_id: CoachId) -> Result<u64, StorageError> {
        let mut guard = self.lock()?;
        let before = guard.sessions.len();
        guard.sessions.retain(|_, s| s.coach_id() != coach_id);
        Ok((before - guard.sessions.len()) as u64)
    }

    async fn hour_totals(&self, coach_id: CoachId) -> Result<Vec<HourTotal>, StorageError> {
        let sessions = self.list_sessions(coach_id).await?;
        Ok(totals_from_sessions(&sessions))
    }
}

#[async_trait]
impl HealthRepository for InMemoryRepository {
    async fn ping(&self) -> Result<(), StorageError> {
        self.lock().map(|_| ())
    }
}

/// Aggregates repository implementations for easy wiring/swapping.
#[derive(Clone)]
pub struct Storage {
    pub coaches: Arc<dyn CoachRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub health: Arc<dyn HealthRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let coaches: Arc<dyn CoachRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let health: Arc<dyn HealthRepository> = Arc::new(repo);
        Self {
            coaches,
            sessions,
            health,
        }
    }
}
