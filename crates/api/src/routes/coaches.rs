//! Coach CRUD, progress and summary routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use coach_core::model::{Coach, CoachDraft, CoachId, CoachPatch, ObjectiveTargets};
use coach_core::progress::{EquipmentHours, EquipmentProgress, Progress, SessionsSummary};
use serde::{Deserialize, Serialize};
use services::AppServices;

use super::timestamp;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub id: CoachId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Coach> for CoachResponse {
    fn from(coach: &Coach) -> Self {
        Self {
            id: coach.id(),
            name: coach.name().to_string(),
            email: coach.email().map(str::to_owned),
            phone: coach.phone().map(str::to_owned),
            created_at: timestamp(coach.created_at()),
            updated_at: timestamp(coach.updated_at()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedCoachResponse {
    #[serde(flatten)]
    pub coach: CoachResponse,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCoachBody {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<CreateCoachBody> for CoachDraft {
    fn from(body: CreateCoachBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCoachBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateCoachBody> for CoachPatch {
    fn from(body: UpdateCoachBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentProgressResponse {
    pub practice: f64,
    pub observation: f64,
    pub total: f64,
    pub objectives: ObjectiveTargets,
    pub practice_percentage: f64,
    pub observation_percentage: f64,
    pub total_percentage: f64,
}

impl From<&EquipmentProgress> for EquipmentProgressResponse {
    fn from(entry: &EquipmentProgress) -> Self {
        Self {
            practice: entry.practice,
            observation: entry.observation,
            total: entry.total,
            objectives: entry.objectives,
            practice_percentage: entry.practice_percentage,
            observation_percentage: entry.observation_percentage,
            total_percentage: entry.total_percentage,
        }
    }
}

/// Progress keyed by equipment name.
pub type ProgressResponse = BTreeMap<&'static str, EquipmentProgressResponse>;

fn progress_response(progress: &Progress) -> ProgressResponse {
    progress
        .iter()
        .map(|entry| (entry.equipment.as_str(), entry.into()))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct EquipmentHoursResponse {
    pub practice: f64,
    pub observation: f64,
    pub total: f64,
}

impl From<&EquipmentHours> for EquipmentHoursResponse {
    fn from(hours: &EquipmentHours) -> Self {
        Self {
            practice: hours.practice,
            observation: hours.observation,
            total: hours.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_sessions: u32,
    pub total_hours: f64,
    pub by_equipment: BTreeMap<&'static str, EquipmentHoursResponse>,
}

impl From<&SessionsSummary> for SummaryResponse {
    fn from(summary: &SessionsSummary) -> Self {
        Self {
            total_sessions: summary.total_sessions,
            total_hours: summary.total_hours,
            by_equipment: summary
                .by_equipment
                .iter()
                .map(|hours| (hours.equipment.as_str(), hours.into()))
                .collect(),
        }
    }
}

/// Coach routes, mounted under `/api`.
pub struct CoachRoutes;

impl CoachRoutes {
    pub fn routes(services: AppServices) -> Router {
        Router::new()
            .route("/coaches", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/coaches/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/coaches/:id/progress", get(Self::handle_progress))
            .route("/coaches/:id/summary", get(Self::handle_summary))
            .with_state(services)
    }

    /// Handle GET /api/coaches
    async fn handle_list(State(services): State<AppServices>) -> Result<Response, ApiError> {
        let coaches = services.coach_service().list_coaches().await?;
        let response: Vec<CoachResponse> = coaches.iter().map(CoachResponse::from).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/coaches
    async fn handle_create(
        State(services): State<AppServices>,
        ApiJson(body): ApiJson<CreateCoachBody>,
    ) -> Result<Response, ApiError> {
        let coach = services.coach_service().create_coach(body.into()).await?;
        tracing::info!(coach_id = %coach.id(), "coach created");
        let response = CreatedCoachResponse {
            coach: CoachResponse::from(&coach),
            message: "Coach created successfully",
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/coaches/:id
    async fn handle_get(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        let coach = services.coach_service().get_coach(id.parse()?).await?;
        Ok((StatusCode::OK, Json(CoachResponse::from(&coach))).into_response())
    }

    /// Handle PUT /api/coaches/:id
    async fn handle_update(
        State(services): State<AppServices>,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<UpdateCoachBody>,
    ) -> Result<Response, ApiError> {
        let coach = services
            .coach_service()
            .update_coach(id.parse()?, body.into())
            .await?;
        Ok((StatusCode::OK, Json(CoachResponse::from(&coach))).into_response())
    }

    /// Handle DELETE /api/coaches/:id
    async fn handle_delete(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        let id: CoachId = id.parse()?;
        services.coach_service().delete_coach(id).await?;
        tracing::info!(coach_id = %id, "coach deleted");
        let response = MessageResponse {
            message: "Coach deleted successfully".into(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/coaches/:id/progress
    async fn handle_progress(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        let progress = services.progress_service().compute_progress(id.parse()?).await?;
        Ok((StatusCode::OK, Json(progress_response(&progress))).into_response())
    }

    /// Handle GET /api/coaches/:id/summary
    async fn handle_summary(
        State(services): State<AppServices>,
        Path(id): Path<String>,
    ) -> Result<Response, ApiError> {
        let summary = services.progress_service().summarize(id.parse()?).await?;
        Ok((StatusCode::OK, Json(SummaryResponse::from(&summary))).into_response())
    }
}
