//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub lesson_provider: String,
    pub lesson_model: String,
    pub lesson_configured: bool,
    pub twilio_configured: bool,
}

/// GET /health
///
/// `status` is "degraded" when the database does not answer.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    let status = if database { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        module: "tutor-bot".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            lesson_provider: state.generator.provider_id().to_string(),
            lesson_model: state.config.llm.model.clone(),
            lesson_configured: state.generator.is_configured(),
            twilio_configured: state.twilio.is_some(),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
