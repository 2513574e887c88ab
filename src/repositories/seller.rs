use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use tokio::sync::RwLock;
use tokio_postgres::{Row, error::SqlState};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::seller::{NewSeller, Seller},
};

const EMAIL_TAKEN: &str = "Email already registered";

/// Lookup and persistence of sellers.
///
/// Login only needs `find_by_email`; registration and the profile route use
/// the rest.
#[async_trait]
pub trait SellerRepository: Send + Sync {
    /// Finds a seller by their normalized email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>>;

    /// Finds a seller by their ID.
    async fn find_by_id(&self, seller_id: Uuid) -> Result<Option<Seller>>;

    /// Persists a new seller. Fails with `Conflict` when the email is taken.
    async fn create(&self, seller: NewSeller) -> Result<Seller>;
}

/// A helper function to map a `tokio_postgres::Row` to a `Seller`.
fn row_to_seller(row: &Row) -> Result<Seller> {
    Ok(Seller {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Sellers stored in the `sellers` table.
#[derive(Clone)]
pub struct PgSellerRepository {
    pool: Pool,
}

impl PgSellerRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SellerRepository for PgSellerRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, password, created_at
                FROM sellers
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_seller(&r)).transpose()
    }

    async fn find_by_id(&self, seller_id: Uuid) -> Result<Option<Seller>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, password, created_at
                FROM sellers
                WHERE id = $1
                "#,
                &[&seller_id],
            )
            .await?;
        row.map(|r| row_to_seller(&r)).transpose()
    }

    async fn create(&self, seller: NewSeller) -> Result<Seller> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                r#"
                INSERT INTO sellers (id, name, email, password)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, email, password, created_at
                "#,
                &[&id, &seller.name, &seller.email, &seller.password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict(EMAIL_TAKEN.to_string())
                } else {
                    AppError::Database(e)
                }
            })?;
        row_to_seller(&row)
    }
}

/// In-memory seller storage (volatile - lost on restart).
#[derive(Default)]
pub struct InMemorySellerRepository {
    sellers: RwLock<HashMap<Uuid, Seller>>,
}

impl InMemorySellerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sellers.
    pub async fn count(&self) -> usize {
        self.sellers.read().await.len()
    }
}

#[async_trait]
impl SellerRepository for InMemorySellerRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>> {
        let sellers = self.sellers.read().await;
        Ok(sellers.values().find(|s| s.email == email).cloned())
    }

    async fn find_by_id(&self, seller_id: Uuid) -> Result<Option<Seller>> {
        Ok(self.sellers.read().await.get(&seller_id).cloned())
    }

    async fn create(&self, seller: NewSeller) -> Result<Seller> {
        let mut sellers = self.sellers.write().await;
        if sellers.values().any(|s| s.email == seller.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let created = Seller {
            id: Uuid::new_v4(),
            name: seller.name,
            email: seller.email,
            password_hash: seller.password_hash,
            created_at: Utc::now(),
        };
        sellers.insert(created.id, created.clone());
        Ok(created)
    }
}
