use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::{seller::SellerProfile, session::Principal},
    services::auth as auth_service,
    state::AppState,
    validation::auth::{normalize_email, validate_body, validate_name},
};

/// The request payload for seller registration.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// Handles seller registration.
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Response> {
    payload.email = normalize_email(&payload.email);
    validate_body(&payload)?;
    validate_name(&payload.name)?;
    tracing::info!("📝 Registration attempt");

    let seller = auth_service::register_seller(
        &state,
        payload.name.trim().to_string(),
        payload.email,
        &payload.password,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(SellerProfile::from(&seller))).into_response())
}

/// Returns the profile of the authenticated seller.
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SellerProfile>> {
    let seller = state
        .sellers
        .find_by_id(principal.seller_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(SellerProfile::from(&seller)))
}
