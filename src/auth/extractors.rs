use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use super::{
    repo::UserStore,
    repo_types::User,
    session::{SessionCodec, SESSION_COOKIE},
};
use crate::{error::StoreError, state::AppState};

/// Who is making the request, resolved once per request by [`resolve_session`].
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub is_authenticated: bool,
    pub user_id: Option<i64>,
    pub user: Option<User>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: User) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user.id),
            user: Some(user),
        }
    }
}

/// Maps a cookie value to an [`AuthContext`]. Anything short of a known user
/// is anonymous; storage trouble is logged, not raised.
pub async fn authenticate(
    sessions: &dyn SessionCodec,
    users: &UserStore,
    token: Option<&str>,
) -> AuthContext {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return AuthContext::anonymous();
    };
    let Some(username) = sessions.decode(token) else {
        debug!("session cookie has an unexpected format");
        return AuthContext::anonymous();
    };
    match users.get_by_username(&username).await {
        Ok(user) => AuthContext::for_user(user),
        Err(StoreError::NotFound) => {
            debug!(%username, "session names an unknown user");
            AuthContext::anonymous()
        }
        Err(e) => {
            error!(error = %e, "user lookup failed while resolving session");
            AuthContext::anonymous()
        }
    }
}

/// Runs on every route and leaves an [`AuthContext`] in the request extensions.
pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());
    let ctx = authenticate(state.sessions.as_ref(), &state.users, token.as_deref()).await;
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Guard for page routes: anonymous visitors are sent to the login form.
pub async fn require_page_session(auth: AuthContext, request: Request, next: Next) -> Response {
    if !auth.is_authenticated {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// Guard for JSON routes: anonymous callers get a bare 401.
pub async fn require_api_session(auth: AuthContext, request: Request, next: Next) -> Response {
    if !auth.is_authenticated {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// The signed-in user. Rejects with 401 when the request is anonymous.
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.user.clone())
            .map(CurrentUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}
