//! Invoice preview route handlers.
//!
//! Invoice totals are derived on every read by aggregating the opt-in
//! ledger; nothing is stored.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use carbon_offset_core::MonthKey;

use crate::db::{MerchantRepository, OptInRepository};
use crate::error::Result;
use crate::state::AppState;

/// Query parameters for an invoice preview.
#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub shop: String,
    pub month: MonthKey,
}

/// Monthly invoice totals for one merchant.
#[derive(Debug, Serialize)]
pub struct InvoicePreview {
    pub shop: String,
    pub month: MonthKey,
    pub total_estimate_cents: i64,
    pub opt_in_count: i64,
}

/// Invoice totals for a shop and month.
#[tracing::instrument(skip(state), fields(shop = %query.shop, month = %query.month))]
pub async fn preview(
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
