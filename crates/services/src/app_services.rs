use std::sync::Arc;

use chrono::Duration;
use coach_core::model::{Coach, CoachDraft, Objectives, SessionDraft};
use storage::repository::{HealthRepository, Storage, StorageError};

use crate::Clock;
use crate::coach_service::CoachService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::session_service::SessionService;

/// Coaches created by `seed_defaults` on an empty database.
const DEFAULT_COACHES: [(&str, &str, &str); 2] = [
    ("Soukeyna", "soukeyna@coachtrack.com", "+221 77 123 4567"),
    ("Fabacary", "fabacary@coachtrack.com", "+221 77 765 4321"),
];

/// (coach index, days ago, equipment, type, hours, notes)
const SAMPLE_SESSIONS: [(usize, i64, &str, &str, f64, &str); 4] = [
    (0, 3, "reformer", "practice", 2.0, "Intensive practice session"),
    (0, 2, "mat", "observation", 1.5, "Observed an advanced class"),
    (1, 4, "chair", "practice", 1.0, "First chair session"),
    (1, 1, "reformer", "observation", 0.5, "Short observation"),
];

/// What `seed_defaults` inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub coaches_created: usize,
    pub sessions_created: usize,
}

/// Assembles app-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    coach_service: Arc<CoachService>,
    session_service: Arc<SessionService>,
    progress_service: Arc<ProgressService>,
    health: Arc<dyn HealthRepository>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, Objectives::CERTIFICATION))
    }

    /// Build services over an existing storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, objectives: Objectives) -> Self {
        let coach_service = Arc::new(CoachService::new(clock, Arc::clone(&storage.coaches)));
        let session_service = Arc::new(SessionService::new(
            clock,
            Arc::clone(&storage.coaches),
            Arc::clone(&storage.sessions),
        ));
        let progress_service = Arc::new(ProgressService::new(
            objectives,
            Arc::clone(&storage.coaches),
            Arc::clone(&storage.sessions),
        ));
        Self {
            coach_service,
            session_service,
            progress_service,
            health: Arc::clone(&storage.health),
        }
    }

    /// In-memory services with the certification objectives.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, Objectives::CERTIFICATION)
    }

    #[must_use]
    pub fn coach_service(&self) -> Arc<CoachService> {
        Arc::clone(&self.coach_service)
    }

    #[must_use]
    pub fn session_service(&self) -> Arc<SessionService> {
        Arc::clone(&self.session_service)
    }

    #[must_use]
    pub fn progress_service(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    /// Check that the backing store answers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unreachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.health.ping().await
    }

    /// Insert the default coaches when no active coach exists.
    ///
    /// With `samples`, a few sessions dated in the recent past are added for
    /// each freshly created coach. Running it again on a populated database
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if a coach or session cannot be persisted.
    pub async fn seed_defaults(&self, samples: bool) -> Result<SeedReport, AppServicesError> {
        if !self.coach_service.list_coaches().await?.is_empty() {
            return Ok(SeedReport::default());
        }

        let mut created: Vec<Coach> = Vec::with_capacity(DEFAULT_COACHES.len());
        for (name, email, phone) in DEFAULT_COACHES {
            let coach = self
                .coach_service
                .create_coach(CoachDraft {
                    name: name.to_string(),
                    email: Some(email.to_string()),
                    phone: Some(phone.to_string()),
                })
                .await?;
            created.push(coach);
        }

        let mut report = SeedReport {
            coaches_created: created.len(),
            sessions_created: 0,
        };
        if !samples {
            return Ok(report);
        }

        let today = self.session_service.today();
        for (index, days_ago, equipment, session_type, hours, notes) in SAMPLE_SESSIONS {
            let Some(coach) = created.get(index) else {
                continue;
            };
            let date = today - Duration::days(days_ago);
            self.session_service
                .create_session(
                    coach.id(),
                    SessionDraft {
                        date: date.format("%Y-%m-%d").to_string(),
                        equipment: equipment.to_string(),
                        session_type: session_type.to_string(),
                        hours,
                        notes: Some(notes.to_string()),
                    },
                )
                .await?;
            report.sessions_created += 1;
        }

        Ok(report)
    }
}
