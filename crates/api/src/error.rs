//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a status
//! derived from the error kind.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coach_core::model::ParseIdError;
use serde_json::json;
use services::{CoachServiceError, ProgressServiceError, SessionServiceError};
use storage::repository::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Backend failure; the detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn coach_not_found() -> Self {
        Self::NotFound("Coach not found".into())
    }

    pub(crate) fn session_not_found() -> Self {
        Self::NotFound("Session not found".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            Self::InvalidInput(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound("Not found".into()),
            StorageError::Conflict => Self::Conflict("Conflict".into()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ParseIdError> for ApiError {
    fn from(err: ParseIdError) -> Self {
        Self::InvalidInput(format!("Invalid {} id", err.kind()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<CoachServiceError> for ApiError {
    fn from(err: CoachServiceError) -> Self {
        match err {
            CoachServiceError::CoachNotFound(_) => Self::coach_not_found(),
            CoachServiceError::DuplicateName(name) => {
                Self::Conflict(format!("A coach named {name} already exists"))
            }
            CoachServiceError::Coach(e) => Self::InvalidInput(e.to_string()),
            CoachServiceError::Storage(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(err: SessionServiceError) -> Self {
        match err {
            SessionServiceError::CoachNotFound(_) => Self::coach_not_found(),
            SessionServiceError::SessionNotFound(_) => Self::session_not_found(),
            SessionServiceError::Session(e) => Self::InvalidInput(e.to_string()),
            SessionServiceError::Storage(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::CoachNotFound(_) => Self::coach_not_found(),
            ProgressServiceError::Storage(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
