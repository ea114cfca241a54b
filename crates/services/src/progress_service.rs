use std::sync::Arc;

use coach_core::model::{CoachId, Objectives};
use coach_core::progress::{Progress, SessionsSummary};
use storage::repository::{CoachRepository, SessionRepository};

use crate::error::ProgressServiceError;

/// Compares a coach's logged hours with the objective table.
///
/// Aggregates are recomputed from storage on every call.
#[derive(Clone)]
pub struct ProgressService {
    objectives: Objectives,
    coaches: Arc<dyn CoachRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        objectives: Objectives,
        coaches: Arc<dyn CoachRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            objectives,
            coaches,
            sessions,
        }
    }

    #[must_use]
    pub fn objectives(&self) -> &Objectives {
        &self.objectives
    }

    async fn ensure_coach(&self, coach_id: CoachId) -> Result<(), ProgressServiceError> {
        match self.coaches.get_coach(coach_id).await? {
            Some(_) => Ok(()),
            None => Err(ProgressServiceError::CoachNotFound(coach_id)),
        }
    }

    /// Per-equipment progress for an active coach.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn compute_progress(&self, coach_id: CoachId) -> Result<Progress, ProgressServiceError> {
        self.ensure_coach(coach_id).await?;
        let totals = self.sessions.hour_totals(coach_id).await?;
        Ok(Progress::from_totals(&self.objectives, &totals))
    }

    /// Session count and hours for an active coach.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::CoachNotFound` if the coach is missing or deleted.
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn summarize(&self, coach_id: CoachId) -> Result<SessionsSummary, ProgressServiceError> {
        self.ensure_coach(coach_id).await?;
        let totals = self.sessions.hour_totals(coach_id).await?;
        Ok(SessionsSummary::from_totals(&totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use coach_core::model::{
        CoachDraft, Equipment, ObjectiveTargets, SessionDraft, SessionId, TrainingSession,
    };
    use coach_core::progress::HourTotal;
    use coach_core::time::fixed_now;
    use storage::repository::{
        InMemoryRepository, NewCoachRecord, NewSessionRecord, StorageError,
    };

    struct BrokenSessions;

    #[async_trait]
    impl SessionRepository for BrokenSessions {
        async fn insert_session(
            &self,
            _session: NewSessionRecord,
        ) -> Result<TrainingSession, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn get_session(
            &self,
            _id: SessionId,
        ) -> Result<Option<TrainingSession>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn list_sessions(
            &self,
            _coach_id: CoachId,
        ) -> Result<Vec<TrainingSession>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn update_session(&self, _session: &TrainingSession) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn delete_session(&self, _id: SessionId) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn delete_sessions_for_coach(&self, _coach_id: CoachId) -> Result<u64, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn hour_totals(&self, _coach_id: CoachId) -> Result<Vec<HourTotal>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    async fn coach(repo: &InMemoryRepository) -> CoachId {
        repo.insert_coach(NewCoachRecord::new(
            CoachDraft::named("Ada").validate().unwrap(),
            fixed_now(),
        ))
        .await
        .unwrap()
        .id()
    }

    async fn log(repo: &InMemoryRepository, coach_id: CoachId, equipment: &str, kind: &str, hours: f64) {
        let session = SessionDraft {
            date: "2023-11-01".into(),
            equipment: equipment.into(),
            session_type: kind.into(),
            hours,
            notes: None,
        }
        .validate(fixed_now().date_naive())
        .unwrap();
        repo.insert_session(NewSessionRecord::new(coach_id, session, fixed_now()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn progress_uses_injected_objectives() {
        let repo = InMemoryRepository::new();
        let coach_id = coach(&repo).await;
        log(&repo, coach_id, "chair", "practice", 2.0).await;

        let small = ObjectiveTargets::new(4, 2, 6);
        let service = ProgressService::new(
            Objectives::new(small, small, small).unwrap(),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let progress = service.compute_progress(coach_id).await.unwrap();
        let chair = progress.get(Equipment::Chair);
        assert_eq!(chair.practice_percentage, 50.0);
        assert!((chair.total_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn progress_and_summary_require_active_coach() {
        let repo = InMemoryRepository::new();
        let coach_id = coach(&repo).await;
        log(&repo, coach_id, "mat", "practice", 1.5).await;
        let service = ProgressService::new(
            Objectives::CERTIFICATION,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );

        let summary = service.summarize(coach_id).await.unwrap();
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.total_hours, 1.5);

        repo.deactivate_coach(coach_id, fixed_now()).await.unwrap();
        assert!(matches!(
            service.compute_progress(coach_id).await,
            Err(ProgressServiceError::CoachNotFound(id)) if id == coach_id
        ));
        assert!(matches!(
            service.summarize(coach_id).await,
            Err(ProgressServiceError::CoachNotFound(_))
        ));
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let repo = InMemoryRepository::new();
        let coach_id = coach(&repo).await;
        let service = ProgressService::new(
            Objectives::CERTIFICATION,
            Arc::new(repo),
            Arc::new(BrokenSessions),
        );
        assert!(matches!(
            service.compute_progress(coach_id).await,
            Err(ProgressServiceError::Storage(StorageError::Connection(_)))
        ));
    }
}
