use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{instrument, warn};

use super::{
    dto::WeightForm,
    services::{log_weight, parse_weight},
};
use crate::{
    auth::CurrentUser,
    db,
    error::{internal, StoreError},
    state::AppState,
    views::WeightsPage,
};

const LIST_LIMIT: i64 = 50;
const PARTIAL_LIMIT: i64 = 10;

/// True for requests issued by htmx, which want a fragment rather than a redirect.
pub fn is_partial_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// GET /weights
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_weights(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, (StatusCode, String)> {
    let entries = state
        .weights
        .recent(user.id, LIST_LIMIT)
        .await
        .map_err(internal)?;

    let today = match state.weights.get_by_date(user.id, db::now().date()).await {
        Ok(e) => Some(e),
        Err(StoreError::NotFound) => None,
        Err(e) => return Err(internal(e)),
    };

    Ok(state.views.weights(&WeightsPage {
        username: &user.username,
        entries: &entries,
        today: today.as_ref(),
    }))
}

/// POST /weights/ (create or overwrite today's entry)
#[instrument(skip(state, user, headers, form), fields(user_id = user.id))]
pub async fn submit_weight(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    Form(form): Form<WeightForm>,
) -> Result<Response, (StatusCode, String)> {
    let weight_kg = parse_weight(&form.weight).map_err(|e| {
        warn!(raw = %form.weight, "rejected weight submission");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    log_weight(&state.weights, user.id, weight_kg, form.notes, db::now())
        .await
        .map_err(internal)?;

    if is_partial_request(&headers) {
        let entries = state
            .weights
            .recent(user.id, PARTIAL_LIMIT)
            .await
            .map_err(internal)?;
        return Ok(state.views.weight_list(&entries).into_response());
    }

    Ok(Redirect::to("/").into_response())
}

/// DELETE /weights/:id
#[instrument(skip(state, user, headers), fields(user_id = user.id))]
pub async fn delete_weight(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response, (StatusCode, String)> {
    state.weights.delete(id, user.id).await.map_err(internal)?;

    if is_partial_request(&headers) {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn partial_requests_are_detected_by_header() {
        let mut headers = HeaderMap::new();
        assert!(!is_partial_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("false"));
        assert!(!is_partial_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_partial_request(&headers));
    }
}
