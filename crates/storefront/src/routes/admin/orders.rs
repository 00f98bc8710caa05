//! Admin order management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sweets_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub message: String,
}

/// Every order, newest first, with customer details and items.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(OrderRepository::new(state.pool()).list_all().await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, request.status)
        .await?;

    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
    let message = format!(
        "Order {}... status updated to {}.",
        order.id.short(),
        order.status
    );
    Ok(Json(OrderResponse { order, message }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.pool())
        .update_payment_status(id, request.payment_status)
        .await?;

    tracing::info!(
        order_id = %order.id,
        payment_status = %order.payment_status,
        "Order payment status updated"
    );
    let message = format!(
        "Order {}... payment status updated to {}.",
        order.id.short(),
        order.payment_status
    );
    Ok(Json(OrderResponse { order, message }))
}
