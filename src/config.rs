use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use crate::crypto::password::HasherKind;

/// Minimum length of the JWT signing secret in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Login throttling settings, applied per client IP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRateLimit {
    /// Seconds needed to replenish one login attempt.
    pub replenish_seconds: u64,
    /// Attempts allowed in a burst before throttling kicks in.
    pub burst_size: u32,
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub database_pool_size: usize,
    /// The secret used to sign session tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// Whether the service runs in production (enables `Secure` cookies).
    pub is_production: bool,
    /// The lifetime of a session token in days.
    pub session_duration_days: i64,
    /// Which password hashing scheme new credentials use.
    pub password_hasher: HasherKind,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
    /// Login throttling, disabled when `None`.
    pub login_rate_limit: Option<LoginRateLimit>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = Zeroizing::new(
            lookup("JWT_SECRET")
                .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?
                .into_bytes(),
        );

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes");
        }

        let is_production = lookup("APP_ENV")
            .unwrap_or_else(|| "development".to_string())
            == "production";

        let session_duration_days: i64 = lookup("SESSION_DURATION_DAYS")
            .unwrap_or_else(|| "7".to_string())
            .parse()
            .context("Invalid SESSION_DURATION_DAYS")?;

        if session_duration_days <= 0 {
            anyhow::bail!("SESSION_DURATION_DAYS must be positive");
        }

        let password_hasher = lookup("PASSWORD_HASHER")
            .unwrap_or_else(|| "argon2".to_string())
            .parse()
            .context("Invalid PASSWORD_HASHER")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let replenish_seconds: u64 = lookup("LOGIN_RATE_LIMIT_REPLENISH_SECONDS")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .context("Invalid LOGIN_RATE_LIMIT_REPLENISH_SECONDS")?;
        let burst_size: u32 = lookup("LOGIN_RATE_LIMIT_BURST")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .context("Invalid LOGIN_RATE_LIMIT_BURST")?;

        let login_rate_limit =
            (replenish_seconds > 0 && burst_size > 0).then_some(LoginRateLimit {
                replenish_seconds,
                burst_size,
            });

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_pool_size: lookup("DATABASE_POOL_SIZE")
                .unwrap_or_else(|| "16".to_string())
                .parse()
                .context("Invalid DATABASE_POOL_SIZE")?,
            jwt_secret,
            is_production,
            session_duration_days,
            password_hasher,
            bind_addr,
            cors_origins,
            login_rate_limit,
        })
    }
}
