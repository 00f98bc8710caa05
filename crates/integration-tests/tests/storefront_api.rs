//! Live API tests for the storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`sweets-cli migrate`)
//! - The seeded catalog (`sweets-cli seed products`)
//! - The storefront running (`cargo run -p sweets-storefront`)
//!
//! Run with: cargo test -p sweets-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps the session cookie between requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

async fn first_product_id(client: &Client) -> i64 {
    let base_url = storefront_base_url();
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    products
        .first()
        .and_then(|p| p["id"].as_i64())
        .expect("catalog is empty; run `sweets-cli seed products`")
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_featured_products_are_featured() {
    let base_url = storefront_base_url();
    let resp = session_client()
        .get(format!("{base_url}/api/products?featured=true"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.unwrap();
    assert!(products.iter().all(|p| p["is_featured"] == true));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_product_is_not_found() {
    let base_url = storefront_base_url();
    let resp = session_client()
        .get(format!("{base_url}/api/products/999999"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart and checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_anonymous_cart_persists_in_session() {
    let base_url = storefront_base_url();
    let client = session_client();
    let product_id = first_product_id(&client).await;

    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["item_count"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_requires_sign_in() {
    let base_url = storefront_base_url();
    let client = session_client();
    let product_id = first_product_id(&client).await;

    client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({ "payment_method": "venmo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_register_then_checkout_clears_cart() {
    let base_url = storefront_base_url();
    let client = session_client();
    let email = format!("test-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({ "email": email, "password": "chocolate-chip" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let session: Value = resp.json().await.unwrap();
    assert_eq!(session["is_admin"], false);

    let product_id = first_product_id(&client).await;
    client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": 3 }))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&json!({ "payment_method": "cashapp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let confirmation: Value = resp.json().await.unwrap();
    assert_eq!(confirmation["item_count"], 3);

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["item_count"], 0);

    let orders: Vec<Value> = client
        .get(format!("{base_url}/api/account/orders"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_admin_routes_reject_customers() {
    let base_url = storefront_base_url();
    let client = session_client();

    let resp = client
        .get(format!("{base_url}/api/admin/orders"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let email = format!("test-{}@example.com", Uuid::new_v4());
    client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({ "email": email, "password": "oatmeal-raisin" }))
        .send()
        .await
        .unwrap();

    let resp = client
        .get(format!("{base_url}/api/admin/orders"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
