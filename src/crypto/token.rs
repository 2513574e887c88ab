//! Session token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}`. Expiry is checked
//! against an injectable [`Clock`] rather than inside `jsonwebtoken`, so
//! tests can move time forward.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::Principal;

/// Source of the current time for token issuance and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (seller ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A token failed validation.
///
/// Carries no reason: bad signatures, malformed input and
/// expired tokens are indistinguishable to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid or expired token")]
pub struct InvalidToken;

impl From<InvalidToken> for AppError {
    fn from(_: InvalidToken) -> Self {
        AppError::InvalidOrExpiredToken
    }
}

/// Signs and validates session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Creates an issuer using the wall clock.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Creates an issuer reading time from `clock`.
    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced against `clock` in `validate`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }

    /// The lifetime of newly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token whose subject is `seller_id`.
    pub fn issue(&self, seller_id: Uuid) -> Result<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: seller_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Validates `token` and returns the principal it names.
    pub fn validate(&self, token: &str) -> std::result::Result<Principal, InvalidToken> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            InvalidToken
        })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            tracing::debug!("Token rejected: expired");
            return Err(InvalidToken);
        }

        let seller_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            tracing::debug!("Token rejected: subject is not a UUID");
            InvalidToken
        })?;

        Ok(Principal::new(seller_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    const SECRET: &[u8] = b"test_secret_key_for_testing_only_32bytes!";

    /// A clock that only moves when told to.
    struct ManualClock {
        seconds: AtomicI64,
    }

    impl ManualClock {
        fn at(seconds: i64) -> Arc<Self> {
            Arc::new(Self {
                seconds: AtomicI64::new(seconds),
            })
        }

        fn advance(&self, by: Duration) {
            self.seconds.fetch_add(by.num_seconds(), Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp(self.seconds.load(Ordering::SeqCst), 0).unwrap()
        }
    }

    fn issuer_with(clock: Arc<ManualClock>) -> TokenIssuer {
        TokenIssuer::with_clock(SECRET, Duration::days(7), clock)
    }

    #[test]
    fn test_issued_token_validates() {
        let issuer = TokenIssuer::new(SECRET, Duration::days(7));
        let seller_id = Uuid::new_v4();

        let token = issuer.issue(seller_id).unwrap();
        let principal = issuer.validate(&token).unwrap();

        assert_eq!(principal.seller_id, seller_id);
    }

    #[test]
    fn test_claims_carry_sub_iat_exp() {
        let clock = ManualClock::at(1_700_000_000);
        let issuer = issuer_with(clock);
        let seller_id = Uuid::new_v4();

        let token = issuer.issue(seller_id).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.sub, seller_id.to_string());
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_000 + 7 * 86_400);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let clock = ManualClock::at(1_700_000_000);
        let issuer = issuer_with(clock.clone());
        let token = issuer.issue(Uuid::new_v4()).unwrap();

        clock.advance(Duration::days(7) - Duration::seconds(1));
        assert!(issuer.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(issuer.validate(&token), Err(InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::days(7));
        let other = TokenIssuer::new(b"another_secret_key_for_testing_32bytes!!", Duration::days(7));

        let token = other.issue(Uuid::new_v4()).unwrap();
        assert_eq!(issuer.validate(&token), Err(InvalidToken));
    }

    #[test]
    fn test_malformed_and_tampered_tokens_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::days(7));
        assert_eq!(issuer.validate(""), Err(InvalidToken));
        assert_eq!(issuer.validate("invalid.token.here"), Err(InvalidToken));

        let token = issuer.issue(Uuid::new_v4()).unwrap();
        let (signed, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", signed, flipped, &signature[1..]);
        assert_eq!(issuer.validate(&tampered), Err(InvalidToken));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::days(7));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        assert_eq!(issuer.validate(&token), Err(InvalidToken));
    }

    #[test]
    fn test_rejections_are_indistinguishable() {
        let clock = ManualClock::at(1_700_000_000);
        let issuer = issuer_with(clock.clone());
        let expired = issuer.issue(Uuid::new_v4()).unwrap();
        clock.advance(Duration::days(8));

        let forged = TokenIssuer::with_clock(
            b"another_secret_key_for_testing_32bytes!!",
            Duration::days(7),
            clock.clone(),
        )
        .issue(Uuid::new_v4())
        .unwrap();

        let expired_err = issuer.validate(&expired).unwrap_err();
        let forged_err = issuer.validate(&forged).unwrap_err();
        let garbage_err = issuer.validate("garbage").unwrap_err();

        assert_eq!(expired_err, forged_err);
        assert_eq!(forged_err, garbage_err);
        assert_eq!(expired_err.to_string(), garbage_err.to_string());
    }
}
