use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, LoginQuery, RegisterForm},
        repo_types::MIN_PASSWORD_LEN,
        session::SESSION_COOKIE,
    },
    error::{internal, StoreError},
    state::AppState,
    views::{LoginPage, RegisterPage},
};

#[instrument(skip(state))]
pub async fn show_login(State(state): State<AppState>, Query(q): Query<LoginQuery>) -> Html<String> {
    state.views.login(&LoginPage {
        error: None,
        registered: q.just_registered(),
    })
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let login_error = |status: StatusCode, msg: &str| {
        (
            status,
            state.views.login(&LoginPage {
                error: Some(msg),
                registered: false,
            }),
        )
            .into_response()
    };

    if form.username.is_empty() || form.password.is_empty() {
        return login_error(StatusCode::BAD_REQUEST, "Username and password are required");
    }

    let user = match state.users.get_by_username(&form.username).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            warn!(username = %form.username, "login unknown username");
            return login_error(StatusCode::UNAUTHORIZED, "Invalid username or password");
        }
        Err(e) => return internal(e).into_response(),
    };

    if !state.users.verify_password(&user, &form.password).await {
        warn!(user_id = user.id, "login invalid password");
        return login_error(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    let token = match state.sessions.encode(&user.username) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "session encode failed");
            return internal(e).into_response();
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.is_production())
        .expires(OffsetDateTime::now_utc() + Duration::hours(state.config.session.ttl_hours));

    info!(user_id = user.id, username = %user.username, "user logged in");
    (jar.add(cookie), Redirect::to("/")).into_response()
}

#[instrument(skip(state))]
pub async fn show_register(State(state): State<AppState>) -> Html<String> {
    state.views.register(&RegisterPage {
        error: None,
        username: "",
    })
}

#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let register_error = |status: StatusCode, msg: &str| {
        (
            status,
            state.views.register(&RegisterPage {
                error: Some(msg),
                username: &form.username,
            }),
        )
            .into_response()
    };

    if form.username.is_empty() || form.password.is_empty() {
        return register_error(StatusCode::BAD_REQUEST, "Username and password are required");
    }
    if form.password != form.confirm_password {
        return register_error(StatusCode::BAD_REQUEST, "Passwords do not match");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return register_error(
            StatusCode::BAD_REQUEST,
            &format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    // Cheap check before paying for a hash; the unique index still decides.
    match state.users.get_by_username(&form.username).await {
        Ok(_) => {
            warn!(username = %form.username, "username already registered");
            return register_error(StatusCode::CONFLICT, "Username already exists");
        }
        Err(StoreError::NotFound) => {}
        Err(e) => return internal(e).into_response(),
    }

    match state.users.create(&form.username, &form.password).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Redirect::to("/login?registered=true").into_response()
        }
        Err(StoreError::Validation(msg)) => register_error(StatusCode::BAD_REQUEST, &msg),
        Err(StoreError::DuplicateUsername) => {
            register_error(StatusCode::CONFLICT, "Username already exists")
        }
        Err(e) => {
            error!(error = %e, username = %form.username, "create user failed");
            register_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
        }
    }
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let cleared = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .expires(OffsetDateTime::now_utc() - Duration::hours(1));
    (jar.add(cleared), Redirect::to("/login"))
}
