mod common;

use common::*;
use morabeza::domain::cart::{Cart, CartLine};
use morabeza::domain::order::OrderStatus;
use morabeza::error::OrderError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_full_checkout_and_webhook_round_trip() {
    let (service, _orders, gateway) = test_service(false);
    let items = menu_items();

    let mut cart = Cart::new();
    cart.add(&items[0]); // 1500
    cart.add(&items[0]);
    cart.add(&items[1]); // 3000

    let created = service.create_checkout(cart, Some("user-7".to_string()), None).await.unwrap();
    assert!(created.redirect_url.starts_with("https://checkout.example/pay/"));

    // The session request carries the correlation metadata and per-line
    // converted amounts.
    let sessions = gateway.sessions.lock().unwrap();
    let request = &sessions[0];
    assert_eq!(request.order_reference, created.order_reference);
    assert_eq!(request.user_id.as_deref(), Some("user-7"));
    assert!(
        request
            .success_url
            .ends_with(&format!("?reference={}", created.order_reference))
    );
    assert_eq!(request.line_items.len(), 2);
    assert_eq!(request.line_items[0].unit_amount, 1464); // round(1500/102.47*100)
    assert_eq!(request.line_items[0].quantity, 2);
    assert_eq!(request.line_items[1].unit_amount, 2928); // round(3000/102.47*100)
    drop(sessions);

    // Provider calls back asynchronously; the order flips to paid.
    let payload = completed_event(created.order_reference.as_str());
    service
        .handle_payment_webhook(&payload, &signed_header(&payload))
        .await
        .unwrap();

    let order = service
        .order_by_reference(&created.order_reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total, dec!(6000));
}

#[tokio::test]
async fn test_webhook_redelivery_is_idempotent() {
    let (service, _orders, _gateway) = test_service(false);
    let items = menu_items();

    let mut cart = Cart::new();
    cart.add(&items[2]);
    let created = service.create_checkout(cart, None, None).await.unwrap();

    let payload = completed_event(created.order_reference.as_str());
    let header = signed_header(&payload);

    // At-least-once delivery: the identical event arrives three times.
    for _ in 0..3 {
        service
            .handle_payment_webhook(&payload, &header)
            .await
            .unwrap();
        let order = service
            .order_by_reference(&created.order_reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }
}

#[tokio::test]
async fn test_invalid_signature_mutates_nothing() {
    let (service, _orders, _gateway) = test_service(false);
    let items = menu_items();

    let mut cart = Cart::new();
    cart.add(&items[0]);
    let created = service.create_checkout(cart, None, None).await.unwrap();

    let payload = completed_event(created.order_reference.as_str());
    let forged = compute_signature(&payload, "wrong_secret", chrono::Utc::now().timestamp());

    let result = service.handle_payment_webhook(&payload, &forged).await;
    assert!(matches!(result, Err(OrderError::InvalidSignature(_))));

    let order = service
        .order_by_reference(&created.order_reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_unknown_reference_is_acknowledged() {
    let (service, _orders, _gateway) = test_service(false);

    // The provider must not retry a permanently missing order, so an
    // authentic event for an unknown reference still succeeds.
    let payload = completed_event("no-such-order");
    let result = service
        .handle_payment_webhook(&payload, &signed_header(&payload))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_other_event_types_acknowledged_without_processing() {
    let (service, _orders, _gateway) = test_service(false);
    let items = menu_items();

    let mut cart = Cart::new();
    cart.add(&items[0]);
    let created = service.create_checkout(cart, None, None).await.unwrap();

    let payload = serde_json::to_vec(&serde_json::json!({
        "type": "payment_intent.created",
        "data": {"object": {"metadata": {"orderReference": created.order_reference.as_str()}}}
    }))
    .unwrap();
    service
        .handle_payment_webhook(&payload, &signed_header(&payload))
        .await
        .unwrap();

    let order = service
        .order_by_reference(&created.order_reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_empty_cart_never_reaches_the_provider() {
    let (service, orders, gateway) = test_service(false);

    let result = service.create_checkout(Cart::new(), None, None).await;
    assert!(matches!(result, Err(OrderError::InvalidCartState(_))));
    assert_eq!(gateway.session_count(), 0);
    assert!(orders.is_empty().await);
}

#[tokio::test]
async fn test_negative_price_line_rejected_before_any_side_effect() {
    let (service, orders, gateway) = test_service(false);

    // A wire-supplied snapshot is not trusted: a tampered price must be
    // caught before the order row or the provider session exist.
    let mut item = menu_items()[0].clone();
    item.price = dec!(-1500);
    let cart = Cart::from_lines(vec![CartLine { item, quantity: 1 }]);

    let result = service.create_checkout(cart, None, None).await;
    assert!(matches!(result, Err(OrderError::InvalidCartState(_))));
    assert_eq!(gateway.session_count(), 0);
    assert!(orders.is_empty().await);
}

#[tokio::test]
async fn test_zero_quantity_line_rejected_before_any_side_effect() {
    let (service, orders, gateway) = test_service(false);

    let cart = Cart::from_lines(vec![CartLine {
        item: menu_items()[0].clone(),
        quantity: 0,
    }]);

    let result = service.create_checkout(cart, None, None).await;
    assert!(matches!(result, Err(OrderError::InvalidCartState(_))));
    assert_eq!(gateway.session_count(), 0);
    assert!(orders.is_empty().await);
}

#[tokio::test]
async fn test_provider_outage_leaves_order_pending() {
    let (service, orders, gateway) = test_service(true);
    let items = menu_items();

    let mut cart = Cart::new();
    cart.add(&items[1]);

    let result = service.create_checkout(cart, None, None).await;
    assert!(matches!(result, Err(OrderError::PaymentSessionFailed(_))));
    assert_eq!(gateway.session_count(), 1);
    // No rollback: the pending row is an accepted orphan.
    assert_eq!(orders.pending_count().await, 1);
}
