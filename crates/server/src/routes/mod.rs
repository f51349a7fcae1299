//! HTTP route handlers for the offset API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Public API (CORS-open, called by the storefront widget)
//! GET  /v1/config              - Widget placement/verbiage for a shop
//! POST /v1/estimate            - Cart subtotal and offset estimate
//! POST /v1/opt-in              - Record a shopper opt-in
//! GET  /v1/invoices/preview    - Monthly invoice totals for a shop
//!
//! # Admin API (requires bearer token)
//! GET  /v1/admin/merchant      - Effective merchant configuration
//! PUT  /v1/admin/merchant      - Overwrite merchant overrides
//! GET  /v1/admin/invoices      - Monthly invoice totals
//! GET  /v1/admin/opt-ins       - Recorded opt-ins for a month
//! ```

pub mod admin;
pub mod estimate;
pub mod invoices;
pub mod opt_in;
pub mod widget;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the public API router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/config", get(widget::get_config))
        .route("/v1/estimate", post(estimate::create_estimate))
        .route("/v1/opt-in", post(opt_in::record_opt_in))
        .route("/v1/invoices/preview", get(invoices::preview))
}

/// Create the admin API router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/admin/merchant",
            get(admin::get_merchant).put(admin::update_merchant),
        )
        .route("/v1/admin/invoices", get(admin::invoices))
        .route("/v1/admin/opt-ins", get(admin::list_opt_ins))
}

/// Create the combined API router.
pub fn routes() -> Router<AppState> {
    public_routes().merge(admin_routes())
}
