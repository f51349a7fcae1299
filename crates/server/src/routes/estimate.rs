//! Estimate route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use carbon_offset_core::estimate::{self, CartItem};

use crate::db::MerchantRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Estimate request from the storefront widget.
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub shop: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub items: Vec<CartItem>,
}

/// Computed estimate for a cart.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub currency: String,
    pub subtotal_cents: i64,
    pub estimate_cents: i64,
    pub rate: f64,
    pub breakdown: Breakdown,
}

/// Summary of the inputs the estimate was computed from.
#[derive(Debug, Serialize)]
pub struct Breakdown {
    pub items: usize,
}

fn default_currency() -> String {
    "USD".to_owned()
}

/// Compute the offset estimate for a cart.
///
/// The effective rate is the merchant's override when set, else the global
/// default - resolved once here, never inside the estimate math. Carts with
/// negative prices or quantities are rejected with 400.
#[tracing::instrument(skip(state, req), fields(shop = %req.shop, items = req.items.len()))]
pub async fn create_estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&req.shop)
        .await?;

    let rate = merchant.rate.unwrap_or(state.config().default_rate);
    let estimate =
        estimate::compute(&req.items, rate).map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(EstimateResponse {
        currency: req.currency,
        subtotal_cents: estimate.subtotal_cents,
        estimate_cents: estimate.estimate_cents,
        rate,
        breakdown: Breakdown {
            items: req.items.len(),
        },
    }))
}
