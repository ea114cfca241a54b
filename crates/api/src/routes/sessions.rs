//! Training session routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use coach_core::model::{
    CoachId, Equipment, SessionDraft, SessionId, SessionPatch, SessionType, TrainingSession,
};
use serde::{Deserialize, Serialize};
use services::AppServices;

use super::coaches::MessageResponse;
use super::timestamp;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub coach_id: CoachId,
    pub date: String,
    pub equipment: Equipment,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub hours: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&TrainingSession> for SessionResponse {
    fn from(session: &TrainingSession) -> Self {
        Self {
            id: session.id(),
            coach_id: session.coach_id(),
            date: session.date().format("%Y-%m-%d").to_string(),
            equipment: session.equipment(),
            session_type: session.session_type(),
            hours: session.hours().as_f64(),
            notes: session.notes().map(str::to_owned),
            created_at: timestamp(session.created_at()),
            updated_at: timestamp(session.updated_at()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub date: String,
    pub equipment: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub hours: f64,
    pub notes: Option<String>,
}

impl From<CreateSessionBody> for SessionDraft {
    fn from(body: CreateSessionBody) -> Self {
        Self {
            date: body.date,
            equipment: body.equipment,
            session_type: body.session_type,
            hours: body.hours,
            notes: body.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionBody {
    pub date: Option<String>,
    pub equipment: Option<String>,
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

impl From<UpdateSessionBody> for SessionPatch {
    fn from(body: UpdateSessionBody) -> Self {
        Self {
            date: body.date,
            equipment: body.equipment,
            session_type: body.session_type,
            hours: body.hours,
            notes: body.notes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// Session routes, mounted under `/api`.
pub struct SessionRoutes;

impl SessionRoutes {
    pub fn routes(services: AppServices) -> Router {
        Router::new()
            .route(
                "/coaches/:id/sessions",
                get(Self::handle_list)
                    .post(Self::handle_create)
                    .delete(Self::handle_delete_all),
            )
            .route(
                "/sessions/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(services)
    }

    /// Handle GET /api/coaches/:id/sessions
    async fn handle_list(
        State(services): State<AppServices>,
        Path(coach_id): Path<String>,
    ) -> Result<Response, ApiError> {
        let sessions = services
            .session_service()
            .list_sessions(coach_id.parse()?)
            .await?;
        let response: Vec<SessionResponse> = sessions.iter().map(SessionResponse::from).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/coaches/:id/sessions
    async fn handle_create(
        State(services): State<AppServices>,
        Path(coach_id): Path<String>,
        ApiJson(body): ApiJson<CreateSessionBody>,
    ) -> Result<Response, ApiError> {
        let session = services
            .session_service()
            .create_session(coach_id.parse()?, body.into())
            .await?;
        tracing::info!(
            session_id = %session.id(),
            coach_id = %session.coach_id(),
            "session recorded"
        );
        Ok((StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response())
    }

    /// Handle DELETE /api/coaches/:id/sessions
    async fn handle_delete_all(
        State(services): State<AppServices>,
        Path(coach_id): Path<String>,
    ) -> Result<Response, ApiError> {
        let coach_id: CoachId = coach_id.parse()?;
        let deleted_count = services
            .session_service()
            .delete_all_sessions(coach_id)
            .await?;
        tracing::info!(coach_id = %coach_id, deleted_count, "sessions cleared");
        let response = DeleteAllResponse {
            message: format!("{deleted_count} session(s) deleted"),
            deleted_count,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/sessions/:id
    async fn handle_get(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        let session = services.session_service().get_session(id.parse()?).await?;
        Ok((StatusCode::OK, Json(SessionResponse::from(&session))).into_response())
    }

    /// Handle PUT /api/sessions/:id
    async fn handle_update(
        State(services): State<AppServices>,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<UpdateSessionBody>,
    ) -> Result<Response, ApiError> {
        let session = services
            .session_service()
            .update_session(id.parse()?, body.into())
            .await?;
        Ok((StatusCode::OK, Json(SessionResponse::from(&session))).into_response())
    }

    /// Handle DELETE /api/sessions/:id
    async fn handle_delete(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        services.session_service().delete_session(id.parse()?).await?;
        let response = MessageResponse {
            message: "Session deleted successfully".into(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
