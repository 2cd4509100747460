use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{auth::CurrentUser, state::AppState, views::HomePage};

/// GET /
pub async fn home(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Html<String> {
    state.views.home(&HomePage {
        username: &user.username,
    })
}

pub async fn not_found(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, state.views.not_found())
}
