//! Admin route handlers.
//!
//! Every handler here requires the admin bearer token (see
//! [`crate::middleware::auth`]). Merchants are resolved with the same
//! get-or-create used by the public surface, so admin reads never 404 on an
//! unknown shop - they create it.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carbon_offset_core::MonthKey;

use crate::db::{MerchantRepository, OptInRepository};
use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::routes::invoices::{InvoicePreview, InvoiceQuery};
use crate::routes::widget::ShopQuery;
use crate::state::AppState;

/// A merchant's effective configuration: overrides where set, global
/// defaults otherwise.
///
/// The PUT body carries all three fields; there is no partial patch, so an
/// absent field is a deserialization error rather than "keep the old value".
#[derive(Debug, Serialize, Deserialize)]
pub struct MerchantConfig {
    pub placement: String,
    pub verbiage: String,
    pub rate: f64,
}

/// Effective configuration for a merchant.
#[tracing::instrument(skip(state), fields(shop = %query.shop))]
pub async fn get_merchant(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<MerchantConfig>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&query.shop)
        .await?;

    let config = state.config();
    Ok(Json(MerchantConfig {
        placement: merchant
            .placement
            .unwrap_or_else(|| config.default_placement.clone()),
        verbiage: merchant
            .verbiage
            .unwrap_or_else(|| config.default_verbiage.clone()),
        rate: merchant.rate.unwrap_or(config.default_rate),
    }))
}

/// Overwrite a merchant's configuration overrides.
#[tracing::instrument(skip(state, body), fields(shop = %query.shop))]
pub async fn update_merchant(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    Json(body): Json<MerchantConfig>,
) -> Result<Json<MerchantConfig>> {
    let repo = MerchantRepository::new(state.pool());
    let merchant = repo.get_or_create(&query.shop).await?;

    repo.update_overrides(merchant.id, &body.placement, &body.verbiage, body.rate)
        .await?;

    Ok(Json(body))
}

/// Invoice totals for a shop and month (admin mirror of the public preview).
#[tracing::instrument(skip(state), fields(shop = %query.shop, month = %query.month))]
pub async fn invoices(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<InvoicePreview>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&query.shop)
        .await?;

    let totals = OptInRepository::new(state.pool())
        .invoice_preview(merchant.id, &query.month)
        .await?;

    Ok(Json(InvoicePreview {
        shop: query.shop,
        month: query.month,
        total_estimate_cents: totals.total_estimate_cents,
        opt_in_count: totals.opt_in_count,
    }))
}

/// Query parameters for listing opt-ins.
#[derive(Debug, Deserialize)]
pub struct OptInListQuery {
    pub shop: String,
    pub month: MonthKey,
    pub limit: Option<i64>,
}

/// One recorded opt-in, as shown to the admin.
#[derive(Debug, Serialize)]
pub struct OptInRow {
    pub created_at: DateTime<Utc>,
    pub cart_token: String,
    pub subtotal_cents: i64,
    pub estimate_cents: i64,
    pub currency: String,
    pub payload: serde_json::Value,
}

/// Most-recent-first opt-ins for a shop and month.
#[tracing::instrument(skip(state), fields(shop = %query.shop, month = %query.month))]
pub async fn list_opt_ins(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<OptInListQuery>,
) -> Result<Json<Vec<OptInRow>>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&query.shop)
        .await?;

    let limit = query.limit.unwrap_or(OptInRepository::DEFAULT_LIMIT);
    let rows = OptInRepository::new(state.pool())
        .list(merchant.id, &query.month, limit)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|opt_in| OptInRow {
                created_at: opt_in.created_at,
                cart_token: opt_in.cart_token,
                subtotal_cents: opt_in.subtotal_cents,
                estimate_cents: opt_in.estimate_cents,
                currency: opt_in.currency,
                payload: opt_in.payload,
            })
            .collect(),
    ))
}
