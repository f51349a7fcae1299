//! Opt-in route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::db::{MerchantRepository, NewOptIn, OptInRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Opt-in sent by the storefront widget when the shopper checks the box.
#[derive(Debug, Deserialize)]
pub struct OptInRequest {
    pub shop: String,
    pub cart_token: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub subtotal_cents: i64,
    pub estimate_cents: i64,
    /// Opaque document (cart attributes, line details); stored as-is.
    /// Absent or `null` becomes an empty object.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    pub checkout_id: Option<String>,
    pub order_id: Option<String>,
    pub email: Option<String>,
}

/// Acknowledgement returned for a recorded opt-in.
#[derive(Debug, Serialize)]
pub struct OptInAck {
    pub status: &'static str,
}

fn default_currency() -> String {
    "USD".to_owned()
}

fn empty_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Record a shopper opt-in for the current month.
///
/// A second opt-in for the same (shop, cart token) within one UTC month is
/// rejected with 409; a new month or a new cart starts a fresh row.
#[tracing::instrument(skip(state, req), fields(shop = %req.shop))]
pub async fn record_opt_in(
    State(state): State<AppState>,
    Json(req): Json<OptInRequest>,
) -> Result<Json<OptInAck>> {
    if req.subtotal_cents < 0 || req.estimate_cents < 0 {
        return Err(AppError::BadRequest(
            "subtotal_cents and estimate_cents must be non-negative".to_owned(),
        ));
    }

    let payload = req.payload.unwrap_or_else(empty_payload);

    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&req.shop)
        .await?;

    OptInRepository::new(state.pool())
        .record(NewOptIn {
            merchant_id: merchant.id,
            cart_token: &req.cart_token,
            currency: &req.currency,
            subtotal_cents: req.subtotal_cents,
            estimate_cents: req.estimate_cents,
            payload: &payload,
            checkout_id: req.checkout_id.as_deref(),
            order_id: req.order_id.as_deref(),
            email: req.email.as_deref(),
        })
        .await?;

    Ok(Json(OptInAck { status: "ok" }))
}
