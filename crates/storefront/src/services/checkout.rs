//! Checkout: turn the cart into an order.
//!
//! Checkout is a linear sequence with no retries:
//!
//! 1. Require a signed-in user and a non-empty cart.
//! 2. Write the order header (pending / pending).
//! 3. Write one order item per cart entry.
//! 4. Clear the cart and return a confirmation.
//!
//! Steps 2 and 3 are separate writes. If step 3 fails the order header is
//! left behind with no items and the cart is kept so the shopper can retry;
//! `sweets-cli orders purge-orphans` removes such orders later. There is no
//! idempotency key, so submitting twice creates two orders.
//!
//! If clearing the cart fails after both writes, the order stands and the
//! confirmation reports `cart_cleared: false`; the stored cart still holds
//! the items, so the caller must tell the shopper not to check out again.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use sweets_core::{OrderId, PaymentMethod};

use crate::cart::{CartService, CartStore};
use crate::db::RepositoryError;
use crate::models::{CurrentUser, NewOrder, NewOrderItem, Order, OrderItem};

/// Persistence for the two checkout writes.
#[async_trait]
pub trait OrderWriter: Send + Sync {
    /// Insert the order header.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Insert the items of an existing order as one batch.
    async fn create_order_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError>;
}

/// Checkout failures. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("You must be logged in to place an order.")]
    Unauthenticated,

    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("failed to create order: {0}")]
    OrderCreate(#[source] RepositoryError),

    /// The order header exists but has no items.
    #[error("failed to create items for order {order_id}: {source}")]
    OrderItemsCreate {
        order_id: OrderId,
        #[source]
        source: RepositoryError,
    },
}

/// Returned to the shopper after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub payment_method: PaymentMethod,
    pub total: Decimal,
    pub item_count: u64,
    /// False when the order was placed but the cart could not be emptied.
    pub cart_cleared: bool,
}

/// Runs checkout against an [`OrderWriter`].
pub struct CheckoutOrchestrator<W> {
    writer: W,
}

impl<W: OrderWriter> CheckoutOrchestrator<W> {
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Place an order for everything in `cart`.
    ///
    /// The cart is cleared only after both writes succeed. A failure to
    /// clear it afterwards is logged and reported through
    /// [`Confirmation::cart_cleared`]; the order stands.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Unauthenticated` without a user,
    /// `CheckoutError::EmptyCart` for an empty cart, and
    /// `CheckoutError::OrderCreate` / `CheckoutError::OrderItemsCreate` when
    /// the corresponding write is rejected.
    #[instrument(skip(self, user, cart))]
    pub async fn checkout<S: CartStore>(
        &self,
        user: Option<&CurrentUser>,
        cart: &mut CartService<S>,
        payment_method: PaymentMethod,
    ) -> Result<Confirmation, CheckoutError> {
        let user = user.ok_or(CheckoutError::Unauthenticated)?;
        if cart.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = cart.total();
        let item_count = cart.item_count();

        let order = self
            .writer
            .create_order(&NewOrder {
                user_id: user.id,
                total_amount: total,
                payment_method,
            })
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to create order");
                CheckoutError::OrderCreate(e)
            })?;

        let items: Vec<NewOrderItem> = cart
            .cart()
            .items()
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        self.writer
            .create_order_items(order.id, &items)
            .await
            .map_err(|e| {
                tracing::error!(
                    order_id = %order.id,
                    error = %e,
                    "Failed to create order items; order left without items"
                );
                CheckoutError::OrderItemsCreate {
                    order_id: order.id,
                    source: e,
                }
            })?;

        let cart_cleared = match cart.clear().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Order placed but cart was not cleared");
                false
            }
        };

        tracing::info!(
            order_id = %order.id,
            user_id = %user.id,
            total = %total,
            items = items.len(),
            "Order placed"
        );

        Ok(Confirmation {
            order_id: order.id,
            payment_method,
            total,
            item_count,
            cart_cleared,
        })
    }
}
