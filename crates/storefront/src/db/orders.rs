//! Order repository.
//!
//! Order headers and their items are written by two separate statements.
//! See [`crate::services::checkout`] for how a failure between them is handled.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use sweets_core::{
    Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId,
    UserId,
};

use super::RepositoryError;
use crate::models::{
    CustomerRef, NewOrder, NewOrderItem, Order, OrderItem, OrderItemDetail, OrderSummary,
};
use crate::services::checkout::OrderWriter;

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, payment_method, payment_status, \
                             created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: Decimal,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_amount: row.total_amount,
            status: row.status,
            payment_method: row.payment_method,
            payment_status: row.payment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: Uuid,
    product_id: i32,
    quantity: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} for order item {}",
                row.quantity, row.id
            ))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for order item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity,
            price,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemDetailRow {
    #[sqlx(flatten)]
    item: OrderItemRow,
    product_name: Option<String>,
    product_image_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

/// Repository for orders and order items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order header with pending status and payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, total_amount, payment_method, status, payment_status) \
             VALUES ($1, $2, $3, 'pending', 'pending') \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.payment_method)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Insert every item of an order in a single statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut product_ids = Vec::with_capacity(items.len());
        let mut quantities = Vec::with_capacity(items.len());
        let mut prices = Vec::with_capacity(items.len());
        for item in items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity {} is out of range", item.quantity))
            })?;
            product_ids.push(item.product_id.as_i32());
            quantities.push(quantity);
            prices.push(item.price.amount());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            "INSERT INTO order_items (order_id, product_id, quantity, price) \
             SELECT $1, product_id, quantity, price \
             FROM UNNEST($2::int4[], $3::int4[], $4::numeric[]) AS t(product_id, quantity, price) \
             RETURNING id, order_id, product_id, quantity, price, created_at",
        )
        .bind(order_id)
        .bind(&product_ids)
        .bind(&quantities)
        .bind(&prices)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// A user's orders, newest first, with items and product details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders: Vec<Order> = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

        let mut items = self.items_for(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderSummary {
                items: items.remove(&order.id).unwrap_or_default(),
                order,
                customer: None,
            })
            .collect())
    }

    /// Every order, newest first, with the customer's name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            "SELECT o.id, o.user_id, o.total_amount, o.status, o.payment_method, \
                    o.payment_status, o.created_at, o.updated_at, \
                    p.full_name AS customer_name, p.email AS customer_email \
             FROM orders o \
             LEFT JOIN profiles p ON p.id = o.user_id \
             ORDER BY o.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            // A malformed contact email is shown as missing rather than failing the listing.
            let email = row.customer_email.and_then(|e| Email::parse(&e).ok());
            orders.push((
                Order::from(row.order),
                CustomerRef {
                    full_name: row.customer_name,
                    email,
                },
            ));
        }

        let headers: Vec<Order> = orders.iter().map(|(order, _)| order.clone()).collect();
        let mut items = self.items_for(&headers).await?;

        Ok(orders
            .into_iter()
            .map(|(order, customer)| OrderSummary {
                items: items.remove(&order.id).unwrap_or_default(),
                order,
                customer: Some(customer),
            })
            .collect())
    }

    async fn items_for(
        &self,
        orders: &[Order],
    ) -> Result<HashMap<OrderId, Vec<OrderItemDetail>>, RepositoryError> {
        let mut grouped: HashMap<OrderId, Vec<OrderItemDetail>> = HashMap::new();
        if orders.is_empty() {
            return Ok(grouped);
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, OrderItemDetailRow>(
            "SELECT i.id, i.order_id, i.product_id, i.quantity, i.price, i.created_at, \
                    p.name AS product_name, p.image_url AS product_image_url \
             FROM order_items i \
             LEFT JOIN products p ON p.id = i.product_id \
             WHERE i.order_id = ANY($1) \
             ORDER BY i.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        for row in rows {
            let item = OrderItem::try_from(row.item)?;
            grouped.entry(item.order_id).or_default().push(OrderItemDetail {
                item,
                product_name: row.product_name,
                product_image_url: row.product_image_url,
            });
        }

        Ok(grouped)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET payment_status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete pending orders created before `cutoff` that never received items.
    ///
    /// Returns the number of orders removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_orphaned(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM orders o \
             WHERE o.status = 'pending' \
               AND o.created_at < $1 \
               AND NOT EXISTS (SELECT 1 FROM order_items i WHERE i.order_id = o.id)",
        )
        .bind(cutoff)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderWriter for OrderRepository<'_> {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.create(order).await
    }

    async fn create_order_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        self.create_items(order_id, items).await
    }
}
