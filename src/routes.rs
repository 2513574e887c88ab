use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use http::{HeaderValue, Method, header};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::Result,
    handlers,
    middleware_layer::{
        auth::{AccessGuard, GuardState, PublicRoutes, require_auth},
        rate_limit,
    },
    state::AppState,
};

/// Request bodies on these routes are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Routes reachable without a session cookie.
pub fn public_routes() -> PublicRoutes {
    PublicRoutes::new()
        .allow(Method::GET, "/health")
        .allow(Method::POST, "/sellers")
        .allow(Method::POST, "/sellers/sessions")
        .allow(Method::POST, "/sign-out")
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
///
/// Every route passes through the access guard; the ones listed in
/// [`public_routes`] are admitted without a session.
pub fn build_router(state: AppState) -> Result<Router> {
    let guard_state = GuardState {
        guard: AccessGuard::new(state.tokens.clone(), state.cookies),
        public_routes: Arc::new(public_routes()),
    };

    let mut login_routes =
        Router::new().route("/sellers/sessions", post(handlers::sessions::authenticate));
    if let Some(limit) = &state.config.login_rate_limit {
        login_routes = rate_limit::limit_logins(login_routes, limit)?;
    }

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/sellers", post(handlers::sellers::register))
        .route("/sellers/me", get(handlers::sellers::me))
        .route("/sign-out", post(handlers::sessions::sign_out))
        .merge(login_routes)
        .route_layer(from_fn_with_state(guard_state, require_auth))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state);

    Ok(app)
}
