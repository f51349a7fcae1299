//! Opt-in ledger and invoice aggregation.
//!
//! Opt-ins are append-only: rows are inserted once and never updated or
//! deleted. Each row carries a `created_ym` bucket derived from its UTC
//! creation time, and at most one opt-in per (merchant, cart token, bucket)
//! is accepted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use carbon_offset_core::{MerchantId, MonthKey, OptInId};

use super::RepositoryError;

/// A recorded shopper opt-in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptIn {
    pub id: OptInId,
    pub merchant_id: MerchantId,
    pub cart_token: String,
    pub currency: String,
    pub subtotal_cents: i64,
    pub estimate_cents: i64,
    /// Opaque document sent by the widget (cart attributes, line details).
    pub payload: serde_json::Value,
    pub checkout_id: Option<String>,
    pub order_id: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_ym: MonthKey,
}

/// Fields for a new opt-in row. `created_at` and `created_ym` are derived
/// at insert time.
#[derive(Debug)]
pub struct NewOptIn<'a> {
    pub merchant_id: MerchantId,
    pub cart_token: &'a str,
    pub currency: &'a str,
    pub subtotal_cents: i64,
    pub estimate_cents: i64,
    pub payload: &'a serde_json::Value,
    pub checkout_id: Option<&'a str>,
    pub order_id: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Monthly invoice totals for one merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct InvoiceTotals {
    pub total_estimate_cents: i64,
    pub opt_in_count: i64,
}

const OPT_IN_COLUMNS: &str = "id, merchant_id, cart_token, currency, subtotal_cents, \
     estimate_cents, payload, checkout_id, order_id, email, created_at, created_ym";

/// Repository for opt-in database operations.
pub struct OptInRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OptInRepository<'a> {
    /// Default number of rows returned by [`list`](Self::list).
    pub const DEFAULT_LIMIT: i64 = 50;

    /// Create a new opt-in repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an opt-in, bucketing it into the current UTC month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an opt-in already exists for
    /// this (merchant, cart token, month).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record(&self, new: NewOptIn<'_>) -> Result<OptIn, RepositoryError> {
        let created_ym = MonthKey::from_datetime(&Utc::now());

        let row = sqlx::query_as::<_, OptIn>(&format!(
            "INSERT INTO opt_in (merchant_id, cart_token, currency, subtotal_cents, \
                 estimate_cents, payload, checkout_id, order_id, email, created_ym)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {OPT_IN_COLUMNS}"
        ))
        .bind(new.merchant_id)
        .bind(new.cart_token)
        .bind(new.currency)
        .bind(new.subtotal_cents)
        .bind(new.estimate_cents)
        .bind(new.payload)
        .bind(new.checkout_id)
        .bind(new.order_id)
        .bind(new.email)
        .bind(&created_ym)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "opt-in already recorded for this cart this month".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(row)
    }

    /// List a merchant's opt-ins for one month, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        merchant_id: MerchantId,
        month: &MonthKey,
        limit: i64,
    ) -> Result<Vec<OptIn>, RepositoryError> {
        let rows = sqlx::query_as::<_, OptIn>(&format!(
            "SELECT {OPT_IN_COLUMNS} FROM opt_in
             WHERE merchant_id = $1 AND created_ym = $2
             ORDER BY created_at DESC
             LIMIT $3"
        ))
        .bind(merchant_id)
        .bind(month)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Sum estimates and count opt-ins for a merchant and month.
    ///
    /// Returns zero totals when no rows match. Reflects every committed
    /// opt-in at call time; there is no caching layer in front of this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn invoice_preview(
        &self,
        merchant_id: MerchantId,
        month: &MonthKey,
    ) -> Result<InvoiceTotals, RepositoryError> {
        // SUM(BIGINT) yields NUMERIC, hence the cast back
        let totals = sqlx::query_as::<_, InvoiceTotals>(
            "SELECT COALESCE(SUM(estimate_cents), 0)::BIGINT AS total_estimate_cents,
                    COUNT(*) AS opt_in_count
             FROM opt_in
             WHERE merchant_id = $1 AND created_ym = $2",
        )
        .bind(merchant_id)
        .bind(month)
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }
}
