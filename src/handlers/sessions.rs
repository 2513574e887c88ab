use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    error::Result,
    services::auth as auth_service,
    state::AppState,
    validation::auth::{normalize_email, validate_body},
};

/// The message returned after a successful login.
pub const AUTHENTICATED_MESSAGE: &str = "Authentication successful";
/// The message returned after sign-out.
pub const SIGNED_OUT_MESSAGE: &str = "The user was successfully signed out.";

/// The request payload for seller login.
#[derive(Deserialize, Validate)]
pub struct AuthenticateRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

/// The response payload for session requests.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handles seller login.
///
/// The token travels only in the `access_token` cookie, never in the body.
pub async fn authenticate(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<AuthenticateRequest>,
) -> Result<Response> {
    payload.email = normalize_email(&payload.email);
    validate_body(&payload)?;
    tracing::info!("🔐 Login attempt");

    let seller =
        auth_service::authenticate_seller(&state, &payload.email, &payload.password).await?;

    let token = state.tokens.issue(seller.id)?;
    state.cookies.set_login(&cookies, token);
    tracing::info!("✅ Session cookie set for seller: {}", seller.id);

    let response = MessageResponse {
        message: AUTHENTICATED_MESSAGE.to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles sign-out.
///
/// Always succeeds and never looks at the incoming cookie; the token itself
/// stays valid until it expires.
pub async fn sign_out(State(state): State<AppState>, cookies: Cookies) -> Response {
    state.cookies.clear(&cookies);
    tracing::info!("👋 Session cookie cleared");

    let response = MessageResponse {
        message: SIGNED_OUT_MESSAGE.to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
