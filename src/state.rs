use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::crypto::password::{self, CredentialVerifier};
use crate::crypto::token::{Clock, SystemClock, TokenIssuer};
use crate::error::Result;
use crate::repositories::seller::{PgSellerRepository, SellerRepository};
use crate::services::cookies::CookieTransport;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Seller lookup and persistence.
    pub sellers: Arc<dyn SellerRepository>,
    /// Password hashing and verification.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Session token issuer.
    pub tokens: TokenIssuer,
    /// Session cookie transport.
    pub cookies: CookieTransport,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = crate::db::create_pool(&config.database_url, config.database_pool_size)?;
        crate::db::ping(&pool).await?;
        tracing::info!(
            "✅ PostgreSQL pool initialized (max {} connections)",
            config.database_pool_size
        );

        let verifier = password::verifier_for(config.password_hasher)?;
        tracing::info!("✅ Password verifier initialized ({:?})", config.password_hasher);

        Ok(Self::from_parts(
            config.clone(),
            Arc::new(PgSellerRepository::new(pool)),
            verifier,
            Arc::new(SystemClock),
        ))
    }

    /// Assembles state from already-built collaborators.
    pub fn from_parts(
        config: Config,
        sellers: Arc<dyn SellerRepository>,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenIssuer::with_clock(
            &config.jwt_secret,
            Duration::days(config.session_duration_days),
            clock,
        );
        let cookies = CookieTransport::new(config.is_production);

        Self {
            config,
            sellers,
            verifier,
            tokens,
            cookies,
        }
    }
}
