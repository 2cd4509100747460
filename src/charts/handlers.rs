use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument};

use super::{dto::ChartData, stats::WeightStats};
use crate::{auth::CurrentUser, db, state::AppState};

const CHART_DAYS: u32 = 90;
const STATS_WINDOW: i64 = 1000;

fn fetch_failed<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "loading chart data failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to fetch weight data".into(),
    )
}

/// GET /api/chart/weight-data
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn weight_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ChartData>, (StatusCode, String)> {
    let entries = state
        .weights
        .chart_data(user.id, CHART_DAYS)
        .await
        .map_err(fetch_failed)?;
    let chart = ChartData::from_entries(&entries).map_err(fetch_failed)?;
    Ok(Json(chart))
}

/// GET /api/chart/weight-stats
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn weight_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<WeightStats>, (StatusCode, String)> {
    let entries = state
        .weights
        .recent(user.id, STATS_WINDOW)
        .await
        .map_err(fetch_failed)?;
    Ok(Json(WeightStats::compute(&entries, db::now())))
}
