//! Order and order item types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sweets_core::{
    Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId,
    UserId,
};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order. The price is the unit price at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    pub created_at: DateTime<Utc>,
}

/// Order header to insert. Status and payment status always start pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// Order line to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Order item joined with the product it refers to.
///
/// Product fields are `None` when the product has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: Option<String>,
    pub product_image_url: Option<String>,
}

/// Name and email of the customer who placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRef {
    pub full_name: Option<String>,
    pub email: Option<Email>,
}

/// An order with its items, as shown in history and the admin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
}
