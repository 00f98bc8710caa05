//! Shopping cart.
//!
//! The cart lives in a single durable slot (the HTTP session in production)
//! and is rewritten in full after every change. [`Cart`] holds the pure
//! state, [`CartService`] applies operations and persists them through a
//! [`CartStore`].

mod service;
mod store;

pub use service::{CartChange, CartError, CartService};
pub use store::{CartStore, CartStoreError, MemoryCartStore, SessionCartStore};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweets_core::{Price, ProductId};

use crate::models::Product;

/// Largest quantity a single cart entry may hold. Order items store the
/// quantity as a Postgres `integer`.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// A product in the cart with its chosen quantity.
///
/// Name, image and price are copied from the product when it is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.line_total(self.quantity)
    }
}

/// Ordered list of cart entries, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Sum of price times quantity over all entries.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Every entry has a quantity in `1..=MAX_QUANTITY` and no product
    /// appears twice.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(index, item)| {
                (1..=MAX_QUANTITY).contains(&item.quantity)
                    && !self
                        .items
                        .iter()
                        .skip(index + 1)
                        .any(|other| other.product_id == item.product_id)
            })
    }

    /// Add `quantity` of a product. Returns the new quantity and whether an
    /// existing entry was merged, or `None` if the result would exceed
    /// [`MAX_QUANTITY`]. The cart is unchanged on `None`.
    pub(crate) fn add(&mut self, product: &Product, quantity: u32) -> Option<(u32, bool)> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let merged = item
                .quantity
                .checked_add(quantity)
                .filter(|q| *q <= MAX_QUANTITY)?;
            item.quantity = merged;
            return Some((merged, true));
        }
        if quantity > MAX_QUANTITY {
            return None;
        }

        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity,
        });
        Some((quantity, false))
    }

    pub(crate) fn remove(&mut self, product_id: ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|i| i.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Replace the quantity of an existing entry. Unknown ids are ignored.
    pub(crate) fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Option<&CartItem> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id)?;
        item.quantity = quantity;
        Some(item)
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i32, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: "A cookie for testing purposes.".to_owned(),
            price: Price::from_cents(cents).unwrap(),
            image_url: "/placeholder.svg".to_owned(),
            ingredients: vec!["Flour".to_owned()],
            allergens: Vec::new(),
            is_available: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let cookie = product(1, "Classic Chocolate Chip", 250);

        assert_eq!(cart.add(&cookie, 2), Some((2, false)));
        assert_eq!(cart.add(&cookie, 3), Some((5, true)));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_total_uses_exact_decimals() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Classic Chocolate Chip", 250), 2).unwrap();
        cart.add(&product(3, "Peanut Butter Delight", 275), 1).unwrap();

        assert_eq!(cart.total(), Decimal::new(775, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_set_quantity_ignores_unknown_product() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Classic Chocolate Chip", 250), 1).unwrap();

        assert!(cart.set_quantity(ProductId::new(9), 4).is_none());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut cart = Cart::new();
        cart.add(&product(4, "Sugar Cookie", 200), 1).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["product_id"], 4);
        assert_eq!(json[0]["quantity"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_merge_past_limit_leaves_entry_untouched() {
        let mut cart = Cart::new();
        let cookie = product(1, "Classic Chocolate Chip", 250);
        cart.add(&cookie, MAX_QUANTITY - 1).unwrap();

        assert_eq!(cart.add(&cookie, 2), None);
        assert_eq!(cart.get(cookie.id).unwrap().quantity, MAX_QUANTITY - 1);
        assert_eq!(cart.add(&cookie, 1), Some((MAX_QUANTITY, true)));
    }

    #[test]
    fn test_new_entry_above_limit_is_refused() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(&product(2, "Oatmeal Raisin", 1), 3_000_000_000), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_consistency_check() {
        let entry = |id: i32, quantity: u32| CartItem {
            product_id: ProductId::new(id),
            name: "Sugar Cookie".to_owned(),
            image_url: "/placeholder.svg".to_owned(),
            price: Price::from_cents(200).unwrap(),
            quantity,
        };

        assert!(Cart { items: vec![entry(1, 2), entry(2, 1)] }.is_consistent());
        assert!(!Cart { items: vec![entry(1, 0)] }.is_consistent());
        assert!(!Cart { items: vec![entry(1, 3_000_000_000)] }.is_consistent());
        assert!(!Cart { items: vec![entry(1, 1), entry(1, 2)] }.is_consistent());
    }
}
