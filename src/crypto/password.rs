use std::str::FromStr;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// Plaintext hashed once at construction to produce the dummy hash.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// bcrypt only reads this many bytes of a password.
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Which hashing scheme a verifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherKind {
    Argon2,
    Bcrypt,
}

impl HasherKind {
    /// Detects the scheme that produced `stored_hash` from its prefix.
    pub fn of_stored_hash(stored_hash: &str) -> Option<Self> {
        if stored_hash.starts_with("$argon2") {
            Some(HasherKind::Argon2)
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| stored_hash.starts_with(prefix))
        {
            Some(HasherKind::Bcrypt)
        } else {
            None
        }
    }
}

impl FromStr for HasherKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(HasherKind::Argon2),
            "bcrypt" => Ok(HasherKind::Bcrypt),
            other => Err(AppError::Validation(format!(
                "Unknown password hasher: {}",
                other
            ))),
        }
    }
}

/// Hashes new secrets and checks submitted secrets against stored hashes.
///
/// `hash` and `dummy_hash` use the verifier's own scheme. `verify` accepts a
/// hash from any supported scheme, so switching `PASSWORD_HASHER` leaves
/// existing sellers able to log in. It answers `Ok(false)` for any mismatch,
/// including a stored hash that cannot be parsed; `Err` means the hashing
/// task itself failed.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Produces a salted one-way hash of `plaintext`.
    async fn hash(&self, plaintext: &str) -> Result<String>;

    /// Checks `plaintext` against `stored_hash`.
    async fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool> {
        verify_stored(plaintext, stored_hash).await
    }

    /// A well-formed hash that matches no real account.
    ///
    /// Login verifies against it when the email is unknown so both paths cost
    /// the same.
    fn dummy_hash(&self) -> &str;
}

/// Builds the verifier selected by configuration.
pub fn verifier_for(kind: HasherKind) -> Result<Arc<dyn CredentialVerifier>> {
    let verifier: Arc<dyn CredentialVerifier> = match kind {
        HasherKind::Argon2 => Arc::new(Argon2Verifier::new()?),
        HasherKind::Bcrypt => Arc::new(BcryptVerifier::new()?),
    };
    Ok(verifier)
}

/// Runs CPU-heavy hashing on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Checks `plaintext` against a stored hash of either scheme.
async fn verify_stored(plaintext: &str, stored_hash: &str) -> Result<bool> {
    let password = Zeroizing::new(plaintext.as_bytes().to_vec());
    let stored_hash = stored_hash.to_string();

    let matches = run_blocking(move || {
        Ok(match HasherKind::of_stored_hash(&stored_hash) {
            Some(HasherKind::Argon2) => verify_argon2(&password, &stored_hash),
            Some(HasherKind::Bcrypt) => verify_bcrypt(&password, &stored_hash),
            None => {
                tracing::warn!("Stored password hash has an unknown format");
                false
            }
        })
    })
    .await?;

    tracing::debug!("Password verification completed");
    Ok(matches)
}

/// Argon2id hashing with PHC-formatted output.
#[derive(Clone)]
pub struct Argon2Verifier {
    params: Params,
    dummy_hash: String,
}

impl Argon2Verifier {
    /// Creates a verifier with the production cost parameters.
    pub fn new() -> Result<Self> {
        Self::with_params(
            ARGON2_MEMORY_MB * 1024,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
        )
    }

    /// Creates a verifier with explicit cost parameters.
    ///
    /// # Arguments
    ///
    /// * `memory_kib` - Memory cost in KiB.
    /// * `iterations` - Number of passes.
    /// * `parallelism` - Degree of parallelism.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = ParamsBuilder::new()
            .m_cost(memory_kib)
            .t_cost(iterations)
            .p_cost(parallelism)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?;

        let dummy_hash = hash_argon2(&params, DUMMY_PASSWORD.as_bytes())?;

        Ok(Self { params, dummy_hash })
    }
}

fn hash_argon2(params: &Params, password: &[u8]) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.clone(),
    );

    let password_hash = argon2
        .hash_password(password, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    Ok(password_hash)
}

fn verify_argon2(password: &[u8], hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored Argon2 hash could not be parsed: {}", e);
            return false;
        }
    };

    // Cost parameters come from the PHC string, not from `Argon2::default()`.
    Argon2::default()
        .verify_password(password, &parsed_hash)
        .is_ok()
}

#[async_trait]
impl CredentialVerifier for Argon2Verifier {
    async fn hash(&self, plaintext: &str) -> Result<String> {
        let password = Zeroizing::new(plaintext.as_bytes().to_vec());
        let params = self.params.clone();

        let hash = run_blocking(move || hash_argon2(&params, &password)).await?;
        tracing::debug!("Password hashed successfully with Argon2");
        Ok(hash)
    }

    fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}

fn verify_bcrypt(password: &[u8], hash: &str) -> bool {
    // Longer passwords are never hashed, so they cannot match.
    if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
        return false;
    }

    match bcrypt::non_truncating_verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored bcrypt hash could not be checked: {}", e);
            false
        }
    }
}

/// bcrypt hashing (`$2b$` strings).
///
/// Rejects passwords longer than [`BCRYPT_MAX_PASSWORD_BYTES`] instead of
/// silently truncating them.
#[derive(Clone)]
pub struct BcryptVerifier {
    cost: u32,
    dummy_hash: String,
}

impl BcryptVerifier {
    /// Creates a verifier with bcrypt's default cost.
    pub fn new() -> Result<Self> {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Creates a verifier with an explicit cost (4..=31).
    pub fn with_cost(cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::non_truncating_hash(DUMMY_PASSWORD, cost)
            .map_err(|e| AppError::Internal(format!("bcrypt hash error: {}", e)))?;
        Ok(Self { cost, dummy_hash })
    }
}

#[async_trait]
impl CredentialVerifier for BcryptVerifier {
    async fn hash(&self, plaintext: &str) -> Result<String> {
        if plaintext.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return Err(AppError::Validation(format!(
                "Password must be at most {} bytes",
                BCRYPT_MAX_PASSWORD_BYTES
            )));
        }

        let password = Zeroizing::new(plaintext.to_string());
        let cost = self.cost;

        run_blocking(move || {
            bcrypt::non_truncating_hash(password.as_bytes(), cost)
                .map_err(|e| AppError::Internal(format!("bcrypt hash error: {}", e)))
        })
        .await
    }

    fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}
