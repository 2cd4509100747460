use std::net::SocketAddr;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    auth::{
        extractors::{require_api_session, require_page_session, resolve_session},
        handlers as auth,
    },
    charts::handlers as charts,
    health, middleware, pages,
    state::AppState,
    weights::handlers as weights,
};

/// Who may reach a route, and what anonymous callers get instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Anonymous visitors are redirected to `/login`.
    Page,
    /// Anonymous callers get 401.
    Api,
}

pub struct RouteDef {
    pub path: &'static str,
    pub access: Access,
    pub handler: MethodRouter<AppState>,
}

impl RouteDef {
    fn new(path: &'static str, access: Access, handler: MethodRouter<AppState>) -> Self {
        Self {
            path,
            access,
            handler,
        }
    }

    fn guarded(self) -> MethodRouter<AppState> {
        match self.access {
            Access::Public => self.handler,
            Access::Page => self.handler.route_layer(from_fn(require_page_session)),
            Access::Api => self.handler.route_layer(from_fn(require_api_session)),
        }
    }
}

pub fn route_table() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/", Access::Page, get(pages::home)),
        RouteDef::new("/login", Access::Public, get(auth::show_login).post(auth::login)),
        RouteDef::new("/register", Access::Public, get(auth::show_register).post(auth::register)),
        RouteDef::new("/logout", Access::Public, get(auth::logout)),
        RouteDef::new("/health", Access::Public, get(health::health)),
        RouteDef::new("/weights", Access::Page, get(weights::list_weights)),
        RouteDef::new("/weights/", Access::Page, post(weights::submit_weight)),
        RouteDef::new("/weights/:id", Access::Page, delete(weights::delete_weight)),
        RouteDef::new("/api/chart/weight-data", Access::Api, get(charts::weight_data)),
        RouteDef::new("/api/chart/weight-stats", Access::Api, get(charts::weight_stats)),
    ]
}

pub fn build_app(state: AppState) -> Router {
    let router = route_table()
        .into_iter()
        .fold(Router::new(), |router, route| {
            let path = route.path;
            router.route(path, route.guarded())
        })
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .with_state(state);

    middleware::apply(router)
}

pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
