//! Cart behavior through `CartService` with an in-memory slot.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sweets_core::ProductId;
use sweets_integration_tests::{FlakyCartStore, product};
use sweets_storefront::cart::{
    CartChange, CartError, CartService, MAX_QUANTITY, MemoryCartStore,
};

#[tokio::test]
async fn test_adding_same_product_merges_into_one_entry() {
    let store = MemoryCartStore::new();
    let mut cart = CartService::load(store).await.unwrap();
    let chip = product(1, "Classic Chocolate Chip", 250);

    cart.add(&chip, 2).await.unwrap();
    let change = cart.add(&chip, 3).await.unwrap();

    assert_eq!(
        change,
        CartChange::Merged {
            name: "Classic Chocolate Chip".to_owned(),
            added: 3,
            quantity: 5,
        }
    );
    assert_eq!(cart.cart().items().len(), 1);
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.total(), Decimal::new(1250, 2));
}

#[tokio::test]
async fn test_totals_across_products() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    cart.add(&product(1, "Classic Chocolate Chip", 250), 2)
        .await
        .unwrap();
    cart.add(&product(3, "Peanut Butter Delight", 275), 1)
        .await
        .unwrap();

    assert_eq!(cart.total(), Decimal::new(775, 2));
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn test_zero_quantity_add_is_rejected() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    let result = cart.add(&product(1, "Sugar Cookie", 200), 0).await;

    assert!(matches!(result, Err(CartError::InvalidQuantity)));
    assert!(cart.cart().is_empty());
}

#[tokio::test]
async fn test_set_quantity_zero_matches_remove() {
    let sugar = product(4, "Sugar Cookie", 200);
    let oat = product(2, "Oatmeal Raisin", 225);

    let mut by_zero = CartService::load(MemoryCartStore::new()).await.unwrap();
    let mut by_remove = CartService::load(MemoryCartStore::new()).await.unwrap();
    for cart in [&mut by_zero, &mut by_remove] {
        cart.add(&sugar, 2).await.unwrap();
        cart.add(&oat, 1).await.unwrap();
    }

    let zeroed = by_zero.set_quantity(sugar.id, 0).await.unwrap();
    let removed = by_remove.remove(sugar.id).await.unwrap();

    assert_eq!(zeroed, removed);
    assert_eq!(by_zero.cart(), by_remove.cart());
    assert!(by_zero.cart().get(sugar.id).is_none());
}

#[tokio::test]
async fn test_negative_quantity_removes_entry() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    let sugar = product(4, "Sugar Cookie", 200);
    cart.add(&sugar, 2).await.unwrap();

    cart.set_quantity(sugar.id, -3).await.unwrap();
    assert!(cart.cart().is_empty());
}

#[tokio::test]
async fn test_set_quantity_on_missing_product_is_unchanged() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    cart.add(&product(4, "Sugar Cookie", 200), 1).await.unwrap();

    let change = cart.set_quantity(ProductId::new(99), 4).await.unwrap();
    assert_eq!(change, CartChange::Unchanged);
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn test_item_count_is_sum_of_quantities() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    cart.add(&product(1, "Classic Chocolate Chip", 250), 4)
        .await
        .unwrap();
    cart.add(&product(5, "Double Chocolate Fudge", 300), 2)
        .await
        .unwrap();
    cart.set_quantity(ProductId::new(1), 1).await.unwrap();

    let summed: u64 = cart
        .cart()
        .items()
        .iter()
        .map(|item| u64::from(item.quantity))
        .sum();
    assert_eq!(cart.item_count(), summed);
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn test_cart_survives_reload() {
    let store = MemoryCartStore::new();
    {
        let mut cart = CartService::load(store.clone()).await.unwrap();
        cart.add(&product(1, "Classic Chocolate Chip", 250), 2)
            .await
            .unwrap();
        cart.add(&product(3, "Peanut Butter Delight", 275), 1)
            .await
            .unwrap();
    }

    let reloaded = CartService::load(store).await.unwrap();
    assert_eq!(reloaded.item_count(), 3);
    assert_eq!(reloaded.total(), Decimal::new(775, 2));
    assert_eq!(
        reloaded.cart().get(ProductId::new(3)).unwrap().name,
        "Peanut Butter Delight"
    );
}

#[tokio::test]
async fn test_snapshot_is_a_json_array() {
    let store = MemoryCartStore::new();
    let mut cart = CartService::load(store.clone()).await.unwrap();
    cart.add(&product(1, "Classic Chocolate Chip", 250), 1)
        .await
        .unwrap();

    let raw = store.contents().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.is_array());
    assert_eq!(value[0]["quantity"], 1);
}

#[tokio::test]
async fn test_corrupt_snapshot_loads_empty_and_is_overwritten() {
    let store = MemoryCartStore::with_contents("{not json");
    let mut cart = CartService::load(store.clone()).await.unwrap();
    assert!(cart.cart().is_empty());

    cart.add(&product(2, "Oatmeal Raisin", 225), 1)
        .await
        .unwrap();
    let raw = store.contents().await.unwrap();
    assert!(raw.starts_with('['));
}

#[tokio::test]
async fn test_failed_save_surfaces_storage_error() {
    let store = FlakyCartStore::new();
    let mut cart = CartService::load(store.clone()).await.unwrap();
    store.set_fail_saves(true);

    let result = cart.add(&product(2, "Oatmeal Raisin", 225), 1).await;
    assert!(matches!(result, Err(CartError::Storage(_))));
    assert!(store.contents().await.is_none());
    assert!(cart.cart().is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_memory_in_step_with_storage() {
    let store = FlakyCartStore::new();
    let mut cart = CartService::load(store.clone()).await.unwrap();
    let sugar = product(4, "Sugar Cookie", 200);
    cart.add(&sugar, 2).await.unwrap();
    store.set_fail_saves(true);

    assert!(cart.add(&sugar, 1).await.is_err());
    assert!(cart.set_quantity(sugar.id, 7).await.is_err());
    assert!(cart.remove(sugar.id).await.is_err());
    assert!(cart.clear().await.is_err());

    store.set_fail_saves(false);
    let reloaded = CartService::load(store).await.unwrap();
    assert_eq!(cart.cart(), reloaded.cart());
    assert_eq!(reloaded.item_count(), 2);
}

#[tokio::test]
async fn test_merge_past_quantity_limit_is_rejected() {
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    let sugar = product(4, "Sugar Cookie", 200);
    cart.add(&sugar, MAX_QUANTITY).await.unwrap();

    let result = cart.add(&sugar, 1).await;
    assert!(matches!(result, Err(CartError::InvalidQuantity)));
    assert_eq!(cart.item_count(), u64::from(MAX_QUANTITY));
}
