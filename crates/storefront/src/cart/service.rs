//! Cart operations with write-through persistence.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use sweets_core::ProductId;

use super::{Cart, CartStore, CartStoreError, MAX_QUANTITY};
use crate::models::Product;

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be between 1 and 2147483647")]
    InvalidQuantity,

    #[error(transparent)]
    Storage(#[from] CartStoreError),
}

/// What a cart operation did, for user-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartChange {
    Added { name: String, quantity: u32 },
    Merged { name: String, added: u32, quantity: u32 },
    Removed { name: String },
    Updated { name: String, quantity: u32 },
    Cleared,
    Unchanged,
}

impl CartChange {
    /// Notification text, if this change is announced to the shopper.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Added { name, quantity } => Some(format!("{quantity} {name} added to cart!")),
            Self::Merged { name, added, .. } => Some(format!("{added} more {name} added to cart!")),
            Self::Removed { name } => Some(format!("{name} removed from cart.")),
            Self::Cleared => Some("Your cart has been cleared.".to_owned()),
            Self::Updated { .. } | Self::Unchanged => None,
        }
    }
}

/// Applies cart operations and saves the full cart after each one.
///
/// Built per request over a [`CartStore`]; the cart is restored from the
/// store on construction.
pub struct CartService<S> {
    store: S,
    cart: Cart,
}

impl<S: CartStore> CartService<S> {
    /// Restore the cart from `store`.
    ///
    /// An empty slot yields an empty cart. A slot that does not parse, or
    /// holds entries with quantities outside `1..=MAX_QUANTITY` or repeated
    /// products, is logged and treated as empty; it is overwritten by the
    /// next change.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the slot cannot be read.
    pub async fn load(store: S) -> Result<Self, CartError> {
        let cart = match store.load().await? {
            None => Cart::new(),
            Some(raw) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) if cart.is_consistent() => cart,
                Ok(_) => {
                    tracing::warn!("Discarding cart snapshot with invalid entries");
                    Cart::new()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
                    Cart::new()
                }
            },
        };

        Ok(Self { store, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Add `quantity` of `product`, merging into an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity or when the
    /// entry would exceed [`MAX_QUANTITY`], and `CartError::Storage` if the
    /// cart cannot be saved. The cart is unchanged on error.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&mut self, product: &Product, quantity: u32) -> Result<CartChange, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut next = self.cart.clone();
        let (total_quantity, merged) = next
            .add(product, quantity)
            .ok_or(CartError::InvalidQuantity)?;
        self.commit(next).await?;

        let name = product.name.clone();
        Ok(if merged {
            CartChange::Merged {
                name,
                added: quantity,
                quantity: total_quantity,
            }
        } else {
            CartChange::Added { name, quantity }
        })
    }

    /// Remove a product's entry. Unknown ids leave the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let mut next = self.cart.clone();
        let removed = next.remove(product_id);
        self.commit(next).await?;

        Ok(removed.map_or(CartChange::Unchanged, |item| CartChange::Removed {
            name: item.name,
        }))
    }

    /// Set a product's quantity. Zero or less removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` above [`MAX_QUANTITY`] and
    /// `CartError::Storage` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        if quantity <= 0 {
            return self.remove(product_id).await;
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(CartError::InvalidQuantity)?;

        let mut next = self.cart.clone();
        let change = next
            .set_quantity(product_id, quantity)
            .map_or(CartChange::Unchanged, |item| CartChange::Updated {
                name: item.name.clone(),
                quantity,
            });
        self.commit(next).await?;

        Ok(change)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved; the items
    /// are then still in the cart.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<CartChange, CartError> {
        self.commit(Cart::new()).await?;
        Ok(CartChange::Cleared)
    }

    /// Save `next` and make it the current cart. On a failed save the
    /// current cart stays as it was, matching the stored slot.
    async fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        let snapshot = serde_json::to_string(&next).map_err(CartStoreError::from)?;
        self.store.save(snapshot).await?;
        tracing::debug!(items = next.items().len(), "Cart saved");
        self.cart = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::MemoryCartStore;

    #[test]
    fn test_change_messages() {
        let added = CartChange::Added {
            name: "Sugar Cookie".to_owned(),
            quantity: 2,
        };
        assert_eq!(added.message().unwrap(), "2 Sugar Cookie added to cart!");

        let merged = CartChange::Merged {
            name: "Sugar Cookie".to_owned(),
            added: 3,
            quantity: 5,
        };
        assert_eq!(merged.message().unwrap(), "3 more Sugar Cookie added to cart!");

        assert_eq!(
            CartChange::Cleared.message().unwrap(),
            "Your cart has been cleared."
        );
        assert!(CartChange::Unchanged.message().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_loads_empty() {
        let store = MemoryCartStore::with_contents("{not json");
        let service = CartService::load(store).await.unwrap();
        assert_eq!(service.item_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_unknown_product_is_unchanged() {
        let mut service = CartService::load(MemoryCartStore::new()).await.unwrap();
        let change = service.remove(ProductId::new(42)).await.unwrap();
        assert_eq!(change, CartChange::Unchanged);
    }

    #[tokio::test]
    async fn test_snapshot_with_oversized_quantity_loads_empty() {
        let store = MemoryCartStore::with_contents(
            r#"[{"product_id":1,"name":"Sugar Cookie","image_url":"/placeholder.svg","price":"0.01","quantity":3000000000}]"#,
        );
        let service = CartService::load(store).await.unwrap();
        assert!(service.cart().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_above_limit_is_rejected() {
        let mut service = CartService::load(MemoryCartStore::new()).await.unwrap();
        let result = service
            .set_quantity(ProductId::new(1), i64::from(MAX_QUANTITY) + 1)
            .await;
        assert!(matches!(result, Err(CartError::InvalidQuantity)));
    }
}
