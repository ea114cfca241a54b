//! Shared error types for the services crate.

use thiserror::Error;

use coach_core::model::{CoachError, CoachId, SessionError, SessionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CoachService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoachServiceError {
    #[error("coach {0} not found")]
    CoachNotFound(CoachId),
    #[error("a coach named {0} already exists")]
    DuplicateName(String),
    #[error(transparent)]
    Coach(#[from] CoachError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error("coach {0} not found")]
    CoachNotFound(CoachId),
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("coach {0} not found")]
    CoachNotFound(CoachId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping or seeding app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Coach(#[from] CoachServiceError),
    #[error(transparent)]
    Session(#[from] SessionServiceError),
}
