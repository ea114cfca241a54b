#![forbid(unsafe_code)]

//! HTTP JSON API for coach training tracking, plus static hosting of the
//! browser client.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;

use std::path::Path;

use axum::{
    Json, Router, handler::HandlerWithoutStateExt, http::StatusCode, response::IntoResponse,
};
use serde_json::json;
use services::AppServices;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, CorsConfig, ServerConfig};
pub use error::ApiError;
pub use logging::{LogFormat, LoggingConfig};

use routes::{CoachRoutes, HealthRoutes, SessionRoutes};

/// All `/api` routes, without static hosting or middleware.
pub fn api_routes(services: AppServices) -> Router {
    Router::new()
        .merge(CoachRoutes::routes(services.clone()))
        .merge(SessionRoutes::routes(services.clone()))
        .merge(HealthRoutes::routes(services))
        .fallback(handle_not_found)
}

/// Full application router: `/api`, the static client, CORS and request tracing.
///
/// Any path that is neither a route nor a file gets the JSON 404 body.
pub fn router(services: AppServices, public_dir: &Path, cors: &CorsConfig) -> Router {
    let static_files = ServeDir::new(public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(handle_not_found.into_service());

    Router::new()
        .nest("/api", api_routes(services))
        .fallback_service(static_files)
        .layer(middleware::setup_cors(cors))
        .layer(TraceLayer::new_for_http())
}

async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
