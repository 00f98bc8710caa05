//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness
//! GET    /health/ready               - Readiness (database reachable)
//!
//! # Catalog
//! GET    /api/products               - Available products (?featured=true)
//! GET    /api/products/{id}          - Product detail
//!
//! # Cart (session-backed, no sign-in needed)
//! GET    /api/cart                   - Cart with total and item count
//! POST   /api/cart/items             - Add {product_id, quantity}
//! PATCH  /api/cart/items/{id}        - Set quantity {quantity}
//! DELETE /api/cart/items/{id}        - Remove a product
//! DELETE /api/cart                   - Clear
//!
//! # Checkout
//! POST   /api/checkout               - Place order {payment_method}
//!
//! # Session and auth (auth routes are rate limited)
//! GET    /api/session                - Identity, profile and admin flag
//! POST   /api/auth/register          - Create account and sign in
//! POST   /api/auth/login             - Sign in
//! POST   /api/auth/logout            - Sign out
//!
//! # Account (requires sign-in)
//! GET    /api/account/profile        - Own profile
//! PUT    /api/account/profile        - Update own profile
//! GET    /api/account/orders         - Order history
//!
//! # Admin (requires admin profile)
//! GET    /api/admin/products         - All products
//! POST   /api/admin/products         - Create product
//! PUT    /api/admin/products/{id}    - Update product
//! DELETE /api/admin/products/{id}    - Delete product
//! GET    /api/admin/orders           - All orders
//! PATCH  /api/admin/orders/{id}/status          - Set order status
//! PATCH  /api/admin/orders/{id}/payment-status  - Set payment status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod session;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/orders", get(account::orders))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::products::index).post(admin::products::create),
        )
        .route(
            "/products/{id}",
            put(admin::products::update).delete(admin::products::delete),
        )
        .route("/orders", get(admin::orders::index))
        .route("/orders/{id}/status", patch(admin::orders::update_status))
        .route(
            "/orders/{id}/payment-status",
            patch(admin::orders::update_payment_status),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(checkout::checkout))
        .route("/api/session", get(session::show))
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .nest("/api/admin", admin_routes())
}
