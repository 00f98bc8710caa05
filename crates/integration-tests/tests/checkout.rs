//! Checkout against the recording order writer.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sweets_core::{PaymentMethod, ProductId};
use sweets_integration_tests::{
    FailAt, FlakyCartStore, RecordingOrderWriter, product, shopper,
};
use sweets_storefront::cart::{CartError, CartService, MemoryCartStore};
use sweets_storefront::services::{CheckoutError, CheckoutOrchestrator};

async fn filled_cart(store: MemoryCartStore) -> CartService<MemoryCartStore> {
    let mut cart = CartService::load(store).await.unwrap();
    cart.add(&product(1, "Classic Chocolate Chip", 250), 2)
        .await
        .unwrap();
    cart.add(&product(3, "Peanut Butter Delight", 275), 1)
        .await
        .unwrap();
    cart
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let mut cart = filled_cart(MemoryCartStore::new()).await;

    let result = orchestrator
        .checkout(None, &mut cart, PaymentMethod::Venmo)
        .await;

    assert!(matches!(result, Err(CheckoutError::Unauthenticated)));
    assert!(writer.orders().is_empty());
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();

    let result = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::Stripe)
        .await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(writer.orders().is_empty());
    assert!(writer.items().is_empty());
}

#[tokio::test]
async fn test_checkout_writes_order_and_items() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let store = MemoryCartStore::new();
    let mut cart = filled_cart(store.clone()).await;

    let confirmation = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::CashApp)
        .await
        .unwrap();

    assert_eq!(confirmation.total, Decimal::new(775, 2));
    assert_eq!(confirmation.item_count, 3);
    assert_eq!(confirmation.payment_method, PaymentMethod::CashApp);

    let orders = writer.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, confirmation.order_id);
    assert_eq!(orders[0].user_id, user.id);
    assert_eq!(orders[0].total_amount, Decimal::new(775, 2));

    let items = writer.items();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.order_id == confirmation.order_id));
    let chip = items
        .iter()
        .find(|item| item.product_id == ProductId::new(1))
        .unwrap();
    assert_eq!(chip.quantity, 2);
    assert_eq!(chip.price.amount(), Decimal::new(250, 2));

    assert!(cart.cart().is_empty());
    assert_eq!(store.contents().await.unwrap(), "[]");
}

#[tokio::test]
async fn test_order_failure_keeps_cart() {
    let writer = RecordingOrderWriter::failing_at(FailAt::Order);
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let mut cart = filled_cart(MemoryCartStore::new()).await;

    let result = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::Stripe)
        .await;

    assert!(matches!(result, Err(CheckoutError::OrderCreate(_))));
    assert!(writer.orders().is_empty());
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn test_item_failure_leaves_orphaned_order_and_keeps_cart() {
    let writer = RecordingOrderWriter::failing_at(FailAt::Items);
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let store = MemoryCartStore::new();
    let mut cart = filled_cart(store.clone()).await;

    let result = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::Other)
        .await;

    let Err(CheckoutError::OrderItemsCreate { order_id, .. }) = result else {
        panic!("expected OrderItemsCreate, got {result:?}");
    };
    let orders = writer.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert!(writer.items().is_empty());

    assert_eq!(cart.item_count(), 3);
    let reloaded = CartService::load(store).await.unwrap();
    assert_eq!(reloaded.item_count(), 3);
}

#[tokio::test]
async fn test_each_submission_creates_a_new_order() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");

    let mut first = filled_cart(MemoryCartStore::new()).await;
    let mut second = filled_cart(MemoryCartStore::new()).await;
    let a = orchestrator
        .checkout(Some(&user), &mut first, PaymentMethod::Venmo)
        .await
        .unwrap();
    let b = orchestrator
        .checkout(Some(&user), &mut second, PaymentMethod::Venmo)
        .await
        .unwrap();

    assert_ne!(a.order_id, b.order_id);
    assert_eq!(writer.orders().len(), 2);
}

#[tokio::test]
async fn test_clear_failure_still_confirms_order() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let store = FlakyCartStore::new();
    let mut cart = CartService::load(store.clone()).await.unwrap();
    cart.add(&product(4, "Sugar Cookie", 200), 3).await.unwrap();
    store.set_fail_saves(true);

    let confirmation = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::Stripe)
        .await
        .unwrap();

    assert_eq!(confirmation.total, Decimal::new(600, 2));
    assert!(!confirmation.cart_cleared);
    assert_eq!(writer.orders().len(), 1);
    assert_eq!(writer.items().len(), 1);

    // Memory and storage agree: the items are still there after a reload.
    assert_eq!(cart.item_count(), 3);
    store.set_fail_saves(false);
    let reloaded = CartService::load(store).await.unwrap();
    assert_eq!(reloaded.item_count(), 3);
}

#[tokio::test]
async fn test_successful_checkout_reports_cart_cleared() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer);
    let user = shopper("dani@example.com");
    let mut cart = filled_cart(MemoryCartStore::new()).await;

    let confirmation = orchestrator
        .checkout(Some(&user), &mut cart, PaymentMethod::Venmo)
        .await
        .unwrap();

    assert!(confirmation.cart_cleared);
}

#[tokio::test]
async fn test_oversized_quantity_never_reaches_order_writer() {
    let writer = RecordingOrderWriter::new();
    let orchestrator = CheckoutOrchestrator::new(writer.clone());
    let user = shopper("dani@example.com");
    let penny = product(6, "Crumb", 1);

    let mut cart = CartService::load(MemoryCartStore::new()).await.unwrap();
    let result = cart.add(&penny, 3_000_000_000).await;
    assert!(matches!(result, Err(CartError::InvalidQuantity)));

    let stored = MemoryCartStore::with_contents(
        r#"[{"product_id":6,"name":"Crumb","image_url":"/placeholder.svg","price":"0.01","quantity":3000000000}]"#,
    );
    let mut restored = CartService::load(stored).await.unwrap();

    for cart in [&mut cart, &mut restored] {
        let result = orchestrator
            .checkout(Some(&user), cart, PaymentMethod::Other)
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }
    assert!(writer.orders().is_empty());
}
