//! Cart route handlers.
//!
//! The cart is stored in the visitor's session, so these routes work for
//! anonymous visitors. Each response carries the full cart and, where the
//! change is announced, a `message` for the shopper.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sweets_core::ProductId;

use crate::cart::{CartChange, CartItem, CartService, SessionCartStore};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// One cart line with its computed total.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
}

/// Cart as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: Decimal,
    pub item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CartView {
    fn new(service: &CartService<SessionCartStore>, change: Option<&CartChange>) -> Self {
        Self {
            items: service
                .cart()
                .items()
                .iter()
                .map(|item| CartLineView {
                    line_total: item.line_total(),
                    item: item.clone(),
                })
                .collect(),
            total: service.total(),
            item_count: service.item_count(),
            message: change.and_then(CartChange::message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

async fn load(session: Session) -> Result<CartService<SessionCartStore>> {
    Ok(CartService::load(SessionCartStore::new(session)).await?)
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let service = load(session).await?;
    Ok(Json(CartView::new(&service, None)))
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get(request.product_id)
        .await?
        .filter(|p| p.is_available)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    let mut service = load(session).await?;
    let change = service.add(&product, request.quantity).await?;

    Ok(Json(CartView::new(&service, Some(&change))))
}

/// Set the quantity of a cart line. Zero or less removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut service = load(session).await?;
    let change = service.set_quantity(product_id, request.quantity).await?;

    Ok(Json(CartView::new(&service, Some(&change))))
}

/// Remove a product from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(product_id): Path<ProductId>) -> Result<Json<CartView>> {
    let mut service = load(session).await?;
    let change = service.remove(product_id).await?;

    Ok(Json(CartView::new(&service, Some(&change))))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut service = load(session).await?;
    let change = service.clear().await?;

    Ok(Json(CartView::new(&service, Some(&change))))
}
