//! HTTP middleware for the offset API.

pub mod auth;

pub use auth::RequireAdminToken;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build the CORS layer from the configured origin list.
///
/// The storefront widget is embedded on arbitrary merchant domains, so the
/// default configuration (`*`) allows any origin. Setting
/// `CORS_ALLOW_ORIGINS` to a comma-separated list restricts it.
#[must_use]
pub fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allow_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|origin| {
            origin.parse().map_or_else(
                |_| {
                    tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                },
                Some,
            )
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
