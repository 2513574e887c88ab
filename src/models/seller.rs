use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a seller and their stored credential.
#[derive(Clone)]
pub struct Seller {
    /// The unique identifier for the seller.
    pub id: Uuid,
    /// The seller's display name.
    pub name: String,
    /// The seller's login email, stored normalized.
    pub email: String,
    /// One-way hash of the seller's password. Never the plaintext.
    pub password_hash: String,
    /// The timestamp when the seller was created.
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Seller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seller")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A seller about to be persisted.
#[derive(Clone)]
pub struct NewSeller {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The public view of a seller.
#[derive(Debug, Clone, Serialize)]
pub struct SellerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Seller> for SellerProfile {
    fn from(seller: &Seller) -> Self {
        Self {
            id: seller.id,
            name: seller.name.clone(),
            email: seller.email.clone(),
            created_at: seller.created_at,
        }
    }
}
