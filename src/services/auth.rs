use crate::error::{AppError, Result};
use crate::models::seller::{NewSeller, Seller};
use crate::state::AppState;

/// Registers a new seller with a hashed password.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `name` - The seller's display name.
/// * `email` - The seller's normalized email.
/// * `password` - The seller's plaintext password.
///
/// # Returns
///
/// A `Result` containing the created `Seller`.
pub async fn register_seller(
    state: &AppState,
    name: String,
    email: String,
    password: &str,
) -> Result<Seller> {
    tracing::debug!("🔐 Registering seller");
    let password_hash = state.verifier.hash(password).await?;

    let seller = state
        .sellers
        .create(NewSeller {
            name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!("✅ Seller registered with ID: {}", seller.id);
    Ok(seller)
}

/// Authenticates a seller by email and password.
///
/// An unknown email and a wrong password fail identically, and the unknown
/// email path still pays for one hash verification.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The seller's normalized email.
/// * `password` - The submitted plaintext password.
///
/// # Returns
///
/// A `Result` containing the authenticated `Seller`.
pub async fn authenticate_seller(state: &AppState, email: &str, password: &str) -> Result<Seller> {
    tracing::debug!("🔐 Authenticating seller");

    let seller = state.sellers.find_by_email(email).await?;

    let stored_hash = seller
        .as_ref()
        .map_or(state.verifier.dummy_hash(), |s| s.password_hash.as_str());
    let verified = state.verifier.verify(password, stored_hash).await?;

    match seller {
        Some(seller) if verified => {
            tracing::info!("✅ Seller authenticated: {}", seller.id);
            Ok(seller)
        }
        _ => Err(AppError::InvalidCredentials),
    }
}
