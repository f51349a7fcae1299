//! Merchant repository for database operations.
//!
//! Merchants are keyed by their shop domain and created lazily the first
//! time any endpoint references the domain. Rows are never deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use carbon_offset_core::MerchantId;

use super::RepositoryError;

/// A merchant row: the shop domain plus its configuration overrides.
///
/// `placement`, `verbiage`, and `rate` are `None` until an admin writes
/// them; callers apply the global defaults for unset fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Merchant {
    pub id: MerchantId,
    pub shop_domain: String,
    pub placement: Option<String>,
    pub verbiage: Option<String>,
    pub rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const MERCHANT_COLUMNS: &str = "id, shop_domain, placement, verbiage, rate, created_at, updated_at";

/// Repository for merchant database operations.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a merchant by its shop domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<Merchant>, RepositoryError> {
        let row = sqlx::query_as::<_, Merchant>(&format!(
            "SELECT {MERCHANT_COLUMNS} FROM merchant WHERE shop_domain = $1"
        ))
        .bind(shop_domain)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Resolve a merchant by shop domain, creating it on first reference.
    ///
    /// Concurrent first-time resolutions of the same domain race on the
    /// unique index; the loser's insert fails and is converted into a read
    /// of the winning row, so the caller always sees exactly one merchant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, shop_domain: &str) -> Result<Merchant, RepositoryError> {
        if let Some(merchant) = self.get_by_domain(shop_domain).await? {
            return Ok(merchant);
        }

        let inserted = sqlx::query_as::<_, Merchant>(&format!(
            "INSERT INTO merchant (shop_domain) VALUES ($1) RETURNING {MERCHANT_COLUMNS}"
        ))
        .bind(shop_domain)
        .fetch_one(self.pool)
        .await;

        match inserted {
            Ok(merchant) => Ok(merchant),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Lost the creation race; the winning row must exist now.
                self.get_by_domain(shop_domain)
                    .await?
                    .ok_or(RepositoryError::NotFound)
            }
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    /// Overwrite all three configuration overrides for a merchant.
    ///
    /// Full-overwrite semantics: there is no partial patch, every call sets
    /// placement, verbiage, and rate together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_overrides(
        &self,
        id: MerchantId,
        placement: &str,
        verbiage: &str,
        rate: f64,
    ) -> Result<Merchant, RepositoryError> {
        let row = sqlx::query_as::<_, Merchant>(&format!(
            "UPDATE merchant
             SET placement = $2, verbiage = $3, rate = $4, updated_at = now()
             WHERE id = $1
             RETURNING {MERCHANT_COLUMNS}"
        ))
        .bind(id)
        .bind(placement)
        .bind(verbiage)
        .bind(rate)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }
}
