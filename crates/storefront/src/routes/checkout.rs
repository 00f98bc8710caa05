//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sweets_core::PaymentMethod;

use crate::cart::{CartService, SessionCartStore};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::read_identity;
use crate::services::checkout::{CheckoutOrchestrator, Confirmation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub confirmation: Confirmation,
    pub message: String,
}

/// Place an order for the session's cart.
///
/// Identity is checked by the orchestrator rather than an extractor so the
/// unauthenticated case reports the checkout message.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let user = read_identity(&session).await;
    let mut cart = CartService::load(SessionCartStore::new(session)).await?;

    let confirmation = CheckoutOrchestrator::new(OrderRepository::new(state.pool()))
        .checkout(user.as_ref(), &mut cart, request.payment_method)
        .await?;

    let mut message = format!(
        "Order {}... placed. Pay with {} to complete it.",
        confirmation.order_id.short(),
        confirmation.payment_method.label()
    );
    if !confirmation.cart_cleared {
        message.push_str(
            " Your cart could not be emptied; please clear it instead of checking out again.",
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            confirmation,
            message,
        }),
    ))
}
