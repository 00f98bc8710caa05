//! Admin product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use sweets_core::ProductId;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductForm};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Every product, including unavailable ones.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list_all().await?))
}

#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let new_product = form.validate()?;
    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;

    tracing::info!(product_id = %product.id, "Product created");
    let message = format!("{} added.", product.name);
    Ok((StatusCode::CREATED, Json(ProductResponse { product, message })))
}

#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(form): Json<ProductForm>,
) -> Result<Json<ProductResponse>> {
    let changes = form.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await?;

    tracing::info!(product_id = %product.id, "Product updated");
    let message = format!("{} updated.", product.name);
    Ok(Json(ProductResponse { product, message }))
}

/// Delete a product. Products that appear in orders cannot be deleted.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<DeletedResponse>> {
    ProductRepository::new(state.pool()).delete(id).await?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(DeletedResponse {
        message: format!("Product {id} deleted."),
    }))
}
