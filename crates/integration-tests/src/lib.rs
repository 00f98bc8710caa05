//! Integration tests for Sweets by Dani.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (cart, checkout, session provider)
//! cargo test -p sweets-integration-tests
//!
//! # Live API tests against a running storefront with a migrated database
//! cargo test -p sweets-integration-tests -- --ignored
//! ```
//!
//! The in-process tests run the storefront services against the fakes in
//! this crate, so they need neither `PostgreSQL` nor a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use sweets_core::{
    Email, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId,
};
use sweets_storefront::cart::{CartStore, CartStoreError, MemoryCartStore};
use sweets_storefront::db::RepositoryError;
use sweets_storefront::models::{
    CurrentUser, NewOrder, NewOrderItem, Order, OrderItem, Product, Profile,
};
use sweets_storefront::services::{OrderWriter, ProfileFetchError, ProfileLookup};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Fixtures
// ============================================================================

/// An available, non-featured product priced in cents.
#[must_use]
pub fn product(id: i32, name: &str, price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: format!("{name} cookie"),
        price: Price::from_cents(price_cents).unwrap_or_else(|e| panic!("bad fixture price: {e}")),
        image_url: "/placeholder.svg".to_owned(),
        ingredients: vec!["Flour".to_owned(), "Butter".to_owned()],
        allergens: vec!["Gluten".to_owned()],
        is_available: true,
        is_featured: false,
        created_at: now,
        updated_at: now,
    }
}

/// A signed-in shopper with a fresh id.
#[must_use]
pub fn shopper(email: &str) -> CurrentUser {
    CurrentUser {
        id: UserId::generate(),
        email: Email::parse(email).unwrap_or_else(|e| panic!("bad fixture email: {e}")),
    }
}

/// A profile row for `user`.
#[must_use]
pub fn profile_for(user: &CurrentUser, is_admin: bool) -> Profile {
    let now = Utc::now();
    Profile {
        id: user.id,
        full_name: Some("Dani Baker".to_owned()),
        email: Some(user.email.clone()),
        home_address: None,
        phone_number: None,
        is_admin,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Order writer
// ============================================================================

/// Which checkout write the fake writer rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Order,
    Items,
}

#[derive(Debug, Default)]
struct Recorded {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    next_item_id: i32,
}

/// In-memory [`OrderWriter`] that records every accepted write.
///
/// Clones share the same record, so a test can keep one handle while the
/// orchestrator owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingOrderWriter {
    recorded: Arc<Mutex<Recorded>>,
    fail_at: Option<FailAt>,
}

impl RecordingOrderWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that rejects the given write with a database error.
    #[must_use]
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at: Some(fail_at),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.recorded).orders.clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<OrderItem> {
        lock(&self.recorded).items.clone()
    }

    fn rejected() -> RepositoryError {
        RepositoryError::Database(sqlx_pool_closed())
    }
}

const fn sqlx_pool_closed() -> sqlx::Error {
    sqlx::Error::PoolClosed
}

#[async_trait]
impl OrderWriter for RecordingOrderWriter {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if self.fail_at == Some(FailAt::Order) {
            return Err(Self::rejected());
        }

        let now = Utc::now();
        let created = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            payment_method: order.payment_method,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        lock(&self.recorded).orders.push(created.clone());
        Ok(created)
    }

    async fn create_order_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        if self.fail_at == Some(FailAt::Items) {
            return Err(Self::rejected());
        }

        let mut recorded = lock(&self.recorded);
        let now = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            recorded.next_item_id += 1;
            created.push(OrderItem {
                id: OrderItemId::new(recorded.next_item_id),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                created_at: now,
            });
        }
        recorded.items.extend(created.iter().cloned());
        Ok(created)
    }
}

// ============================================================================
// Profile lookup
// ============================================================================

/// In-memory [`ProfileLookup`]. Clones share the same profiles.
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    unavailable: Arc<AtomicBool>,
    lookups: Arc<Mutex<Vec<UserId>>>,
}

impl StaticProfiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub fn put(&self, profile: Profile) {
        lock(&self.profiles).insert(profile.id, profile);
    }

    /// Make every lookup fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// User ids looked up so far, in order.
    #[must_use]
    pub fn lookups(&self) -> Vec<UserId> {
        lock(&self.lookups).clone()
    }
}

#[async_trait]
impl ProfileLookup for StaticProfiles {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ProfileFetchError> {
        lock(&self.lookups).push(user_id);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProfileFetchError(RepositoryError::Database(
                sqlx_pool_closed(),
            )));
        }
        Ok(lock(&self.profiles).get(&user_id).cloned())
    }
}

// ============================================================================
// Cart store
// ============================================================================

/// A [`MemoryCartStore`] whose saves can be switched off.
#[derive(Debug, Clone, Default)]
pub struct FlakyCartStore {
    inner: MemoryCartStore,
    fail_saves: Arc<AtomicBool>,
}

impl FlakyCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Raw slot contents of the wrapped store.
    pub async fn contents(&self) -> Option<String> {
        self.inner.contents().await
    }
}

#[async_trait]
impl CartStore for FlakyCartStore {
    async fn load(&self) -> Result<Option<String>, CartStoreError> {
        self.inner.load().await
    }

    async fn save(&self, snapshot: String) -> Result<(), CartStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CartStoreError::Unavailable("storage quota exceeded".to_owned()));
        }
        self.inner.save(snapshot).await
    }
}
