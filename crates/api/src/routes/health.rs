//! Liveness endpoint.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use services::AppServices;

use super::timestamp;

pub struct HealthRoutes;

impl HealthRoutes {
    pub fn routes(services: AppServices) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(services)
    }

    /// Handle GET /api/health. Reports 503 when the database does not answer.
    async fn handle_health(State(services): State<AppServices>) -> Response {
        let (status, state, database) = match services.ping().await {
            Ok(()) => (StatusCode::OK, "healthy", "connected"),
            Err(err) => {
                tracing::warn!(error = %err, "database ping failed");
                (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
            }
        };
        let body = serde_json::json!({
            "status": state,
            "timestamp": timestamp(chrono::Utc::now()),
            "database": database,
        });
        (status, Json(body)).into_response()
    }
}
