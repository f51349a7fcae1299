//! Widget configuration route handlers.
//!
//! The storefront widget fetches its placement selector and opt-in verbiage
//! before rendering, so this endpoint is public and CORS-open.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::db::MerchantRepository;
use crate::error::Result;
use crate::state::AppState;

/// Query parameters identifying the shop.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop: String,
}

/// Widget configuration returned to the storefront.
#[derive(Debug, Serialize)]
pub struct WidgetConfigResponse {
    pub placement: String,
    pub verbiage: String,
}

/// Effective widget configuration for a shop.
///
/// Resolves the merchant (creating it on first reference) and applies the
/// global defaults for any override the merchant has not set.
#[tracing::instrument(skip(state), fields(shop = %query.shop))]
pub async fn get_config(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<WidgetConfigResponse>> {
    let merchant = MerchantRepository::new(state.pool())
        .get_or_create(&query.shop)
        .await?;

    let config = state.config();
    Ok(Json(WidgetConfigResponse {
        placement: merchant
            .placement
            .unwrap_or_else(|| config.default_placement.clone()),
        verbiage: merchant
            .verbiage
            .unwrap_or_else(|| config.default_verbiage.clone()),
    }))
}
