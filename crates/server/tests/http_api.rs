//! Integration tests for the offset API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p offset-cli -- migrate)
//! - The offset server running (cargo run -p carbon-offset-server)
//! - `ADMIN_TOKEN` exported to both the server and the test process for the
//!   admin tests
//!
//! Run with: cargo test -p carbon-offset-server --test http_api -- --ignored

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use carbon_offset_core::MonthKey;

/// Base URL for the offset API (configurable via environment).
fn base_url() -> String {
    std::env::var("OFFSET_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// The admin token the running server was started with, if any.
fn admin_token() -> Option<String> {
    std::env::var("ADMIN_TOKEN").ok()
}

/// Generate a shop domain unique to this test run.
fn unique_shop(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{prefix}-{nanos:x}.myshopify.com")
}

/// The current UTC month, as the server buckets opt-ins.
fn current_month() -> String {
    MonthKey::from_datetime(&chrono::Utc::now()).into_inner()
}

/// Test helper: record an opt-in and return the response status.
async fn record_opt_in(client: &Client, shop: &str, cart_token: &str, estimate_cents: i64) -> StatusCode {
    let resp = client
        .post(format!("{}/v1/opt-in", base_url()))
        .json(&json!({
            "shop": shop,
            "cart_token": cart_token,
            "currency": "USD",
            "subtotal_cents": estimate_cents * 50,
            "estimate_cents": estimate_cents,
            "payload": {"source": "integration-test"},
        }))
        .send()
        .await
        .expect("Failed to post opt-in");
    resp.status()
}

// ============================================================================
// Health & Widget Config Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_health() {
    let resp = reqwest::get(format!("{}/health", base_url()))
        .await
        .expect("Failed to get /health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_widget_config_returns_defaults_for_new_shop() {
    let shop = unique_shop("config-defaults");
    let resp = reqwest::get(format!("{}/v1/config?shop={shop}", base_url()))
        .await
        .expect("Failed to get /v1/config");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse body");
    // Fresh merchants have no overrides, so both fields are the globals
    assert!(body["placement"].is_string());
    assert!(body["verbiage"].is_string());

    // Resolving the same shop again must not create a second merchant;
    // the config must be identical
    let again: Value = reqwest::get(format!("{}/v1/config?shop={shop}", base_url()))
        .await
        .expect("Failed to get /v1/config")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body, again);
}

// ============================================================================
// Estimate Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_estimate_formula() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/v1/estimate", base_url()))
        .json(&json!({
            "shop": unique_shop("estimate"),
            "currency": "USD",
            "items": [
                {"price_cents": 1000, "quantity": 2},
                {"price_cents": 500, "quantity": 1},
            ],
        }))
        .send()
        .await
        .expect("Failed to post estimate");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["subtotal_cents"], 2500);
    assert_eq!(body["breakdown"]["items"], 2);
    assert_eq!(body["currency"], "USD");

    // The estimate follows whatever rate the server resolved
    let rate = body["rate"].as_f64().expect("rate must be a number");
    let expected = (2500.0 * rate).round_ties_even() as i64;
    assert_eq!(body["estimate_cents"], expected);
}

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_estimate_empty_cart() {
    let client = Client::new();
    let body: Value = client
        .post(format!("{}/v1/estimate", base_url()))
        .json(&json!({"shop": unique_shop("estimate-empty"), "items": []}))
        .send()
        .await
        .expect("Failed to post estimate")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body["subtotal_cents"], 0);
    assert_eq!(body["estimate_cents"], 0);
}

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_estimate_rejects_negative_amounts() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/v1/estimate", base_url()))
        .json(&json!({
            "shop": unique_shop("estimate-negative"),
            "items": [{"price_cents": -100, "quantity": 1}],
        }))
        .send()
        .await
        .expect("Failed to post estimate");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Opt-In Ledger Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_opt_in_duplicate_is_conflict() {
    let client = Client::new();
    let shop = unique_shop("opt-in-dup");

    assert_eq!(record_opt_in(&client, &shop, "cart-a", 50).await, StatusCode::OK);
    // Same cart, same month: rejected
    assert_eq!(
        record_opt_in(&client, &shop, "cart-a", 50).await,
        StatusCode::CONFLICT
    );
    // Different cart token: accepted
    assert_eq!(record_opt_in(&client, &shop, "cart-b", 50).await, StatusCode::OK);
}

// ============================================================================
// Invoice Aggregation Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_invoice_preview_totals() {
    let client = Client::new();
    let shop = unique_shop("invoice");

    assert_eq!(record_opt_in(&client, &shop, "cart-1", 50).await, StatusCode::OK);
    assert_eq!(record_opt_in(&client, &shop, "cart-2", 30).await, StatusCode::OK);

    let month = current_month();
    let body: Value = reqwest::get(format!(
        "{}/v1/invoices/preview?shop={shop}&month={month}",
        base_url()
    ))
    .await
    .expect("Failed to get preview")
    .json()
    .await
    .expect("Failed to parse body");

    assert_eq!(body["shop"], shop.as_str());
    assert_eq!(body["month"], month.as_str());
    assert_eq!(body["total_estimate_cents"], 80);
    assert_eq!(body["opt_in_count"], 2);

    // A month with no opt-ins aggregates to zero
    let empty: Value = reqwest::get(format!(
        "{}/v1/invoices/preview?shop={shop}&month=2000-01",
        base_url()
    ))
    .await
    .expect("Failed to get preview")
    .json()
    .await
    .expect("Failed to parse body");
    assert_eq!(empty["total_estimate_cents"], 0);
    assert_eq!(empty["opt_in_count"], 0);
}

#[tokio::test]
#[ignore = "Requires running offset server and PostgreSQL"]
async fn test_invoice_preview_rejects_malformed_month() {
    let shop = unique_shop("invoice-bad-month");
    let resp = reqwest::get(format!(
        "{}/v1/invoices/preview?shop={shop}&month=202608",
        base_url()
    ))
    .await
    .expect("Failed to get preview");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Admin API Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running offset server with ADMIN_TOKEN set"]
async fn test_admin_auth_failures_do_not_mutate() {
    let Some(_token) = admin_token() else {
        // Dev-mode server: nothing to assert
        return;
    };

    let client = Client::new();
    let shop = unique_shop("admin-auth");

    // Capture the shop's public config before the rejected writes
    let before: Value = reqwest::get(format!("{}/v1/config?shop={shop}", base_url()))
        .await
        .expect("Failed to get config")
        .json()
        .await
        .expect("Failed to parse body");

    let put_body = json!({"placement": "#evil", "verbiage": "evil", "rate": 0.99});

    // Missing token
    let resp = client
        .put(format!("{}/v1/admin/merchant?shop={shop}", base_url()))
        .json(&put_body)
        .send()
        .await
        .expect("Failed to put merchant");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong token
    let resp = client
        .put(format!("{}/v1/admin/merchant?shop={shop}", base_url()))
        .bearer_auth("definitely-not-the-token")
        .json(&put_body)
        .send()
        .await
        .expect("Failed to put merchant");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Reads are gated the same way
    let resp = client
        .get(format!("{}/v1/admin/merchant?shop={shop}", base_url()))
        .send()
        .await
        .expect("Failed to get merchant");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The rejected writes must not have touched the merchant
    let after: Value = reqwest::get(format!("{}/v1/config?shop={shop}", base_url()))
        .await
        .expect("Failed to get config")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "Requires running offset server with ADMIN_TOKEN set"]
async fn test_admin_put_then_get_roundtrip() {
    let client = Client::new();
    let shop = unique_shop("admin-roundtrip");
    let token = admin_token().unwrap_or_default();

    let overrides = json!({
        "placement": "#checkout_sidebar",
        "verbiage": "Offset this order's footprint",
        "rate": 0.05,
    });

    let resp = client
        .put(format!("{}/v1/admin/merchant?shop={shop}", base_url()))
        .bearer_auth(&token)
        .json(&overrides)
        .send()
        .await
        .expect("Failed to put merchant");
    assert_eq!(resp.status(), StatusCode::OK);

    // Admin read returns exactly what was written
    let body: Value = client
        .get(format!("{}/v1/admin/merchant?shop={shop}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get merchant")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(body, overrides);

    // The public widget config reflects the overrides
    let config: Value = reqwest::get(format!("{}/v1/config?shop={shop}", base_url()))
        .await
        .expect("Failed to get config")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(config["placement"], "#checkout_sidebar");
    assert_eq!(config["verbiage"], "Offset this order's footprint");

    // Estimates use the override rate: 600 * 0.05 = 30
    let estimate: Value = client
        .post(format!("{}/v1/estimate", base_url()))
        .json(&json!({
            "shop": shop,
            "items": [{"price_cents": 300, "quantity": 2}],
        }))
        .send()
        .await
        .expect("Failed to post estimate")
        .json()
        .await
        .expect("Failed to parse body");
    assert_eq!(estimate["rate"], 0.05);
    assert_eq!(estimate["estimate_cents"], 30);
}

#[tokio::test]
#[ignore = "Requires running offset server with ADMIN_TOKEN set"]
async fn test_admin_list_opt_ins_most_recent_first() {
    let client = Client::new();
    let shop = unique_shop("admin-list");
    let token = admin_token().unwrap_or_default();

    assert_eq!(record_opt_in(&client, &shop, "cart-old", 10).await, StatusCode::OK);
    assert_eq!(record_opt_in(&client, &shop, "cart-new", 20).await, StatusCode::OK);

    let month = current_month();
    let rows: Vec<Value> = client
        .get(format!(
            "{}/v1/admin/opt-ins?shop={shop}&month={month}&limit=10",
            base_url()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list opt-ins")
        .json()
        .await
        .expect("Failed to parse body");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["cart_token"], "cart-new");
    assert_eq!(rows[1]["cart_token"], "cart-old");
    assert_eq!(rows[0]["payload"]["source"], "integration-test");
}
