use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::error;

use crate::{db, state::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health. 503 when the database does not answer a ping.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = match db::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, "healthy", "healthy"),
        Err(e) => {
            error!(error = %e, "health check: database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "error")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: OffsetDateTime::now_utc(),
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
