mod support;

use std::sync::atomic::Ordering;

use rust_decimal::Decimal;

use market_api::application::access::Actor;
use market_api::application::error::ServiceError;
use market_api::application::ports::cart_repository::CartRepository;
use market_api::application::ports::order_repository::OrderRepository;
use market_api::application::use_cases::orders::place_order::PlaceOrder;
use market_api::application::use_cases::orders::set_status::SetOrderStatus;
use market_api::application::use_cases::orders::start_payment::StartPayment;
use market_api::application::use_cases::payments::handle_notification::{
    HandlePaymentNotification, NotificationOutcome,
};
use market_api::application::ports::payment_gateway::PaymentGateway;
use market_api::domain::cart::cart_item::CartItem;
use market_api::domain::orders::order::{OrderLine, OrderStatus};
use market_api::domain::users::user::UserRole;

use support::{FakeGateway, MemoryStore, TestApp};

fn line(product_id: i64, quantity: i32) -> OrderLine {
    OrderLine {
        product_id,
        quantity,
    }
}

fn notification(payment_id: &str, event: &str, status: &str, order_id: i64) -> Vec<u8> {
    serde_json::json!({
        "type": "notification",
        "event": event,
        "object": { "id": payment_id, "status": status, "metadata": { "order_id": order_id.to_string() } }
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn order_without_gateway_is_paid_and_clears_the_cart() {
    let app = TestApp::new(false);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let kettle = app.store.insert_product(1, Decimal::new(100000, 2), 5, 10).await;
    let mug = app.store.insert_product(1, Decimal::new(25050, 2), 3, 0).await;
    CartRepository::insert(
        app.store.as_ref(),
        &CartItem {
            user_id: user.id,
            product_id: kettle.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();

    let settings = app.ctx.payment_settings();
    let uc = PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    };
    // Repeated product ids are merged into one line.
    let placed = uc
        .execute(user.id, &[line(kettle.id, 1), line(mug.id, 2), line(kettle.id, 1)])
        .await
        .unwrap();

    assert_eq!(placed.items.len(), 2);
    // 2 x 900.00 (10% off) + 2 x 250.50
    assert_eq!(placed.order.total, Decimal::new(230100, 2));
    assert!(placed.order.payment_confirmed);
    assert_eq!(placed.payment_url, None);
    assert_eq!(app.store.stock(kettle.id).await, Some(3));
    assert_eq!(app.store.stock(mug.id).await, Some(1));
    assert!(CartRepository::list(app.store.as_ref(), user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let app = TestApp::new(false);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let a = app.store.insert_product(1, Decimal::new(1000, 2), 5, 0).await;
    let b = app.store.insert_product(1, Decimal::new(1000, 2), 1, 0).await;

    let settings = app.ctx.payment_settings();
    let uc = PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    };
    let err = uc
        .execute(user.id, &[line(a.id, 2), line(b.id, 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let err = uc.execute(user.id, &[line(a.id, 1), line(9999, 1)]).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert!(matches!(
        uc.execute(user.id, &[]).await,
        Err(ServiceError::BadRequest(_))
    ));
    assert!(matches!(
        uc.execute(user.id, &[line(a.id, 0)]).await,
        Err(ServiceError::BadRequest(_))
    ));

    assert_eq!(app.store.stock(a.id).await, Some(5));
    assert_eq!(app.store.stock(b.id).await, Some(1));
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn quantities_that_overflow_when_merged_are_rejected() {
    let app = TestApp::new(false);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let plenty = app.store.insert_product(1, Decimal::new(1, 2), i32::MAX, 0).await;

    let settings = app.ctx.payment_settings();
    let uc = PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    };
    let err = uc
        .execute(user.id, &[line(plenty.id, i32::MAX), line(plenty.id, 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(app.store.stock(plenty.id).await, Some(i32::MAX));
    assert_eq!(app.store.order_count().await, 0);

    // A single line at the limit is fine when the stock covers it.
    let placed = uc
        .execute(user.id, &[line(plenty.id, i32::MAX)])
        .await
        .unwrap();
    assert_eq!(placed.items[0].quantity, i32::MAX);
    assert_eq!(app.store.stock(plenty.id).await, Some(0));
}

#[tokio::test]
async fn order_total_must_fit_the_money_column() {
    let app = TestApp::new(false);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let pricey = app.store.insert_product(1, Decimal::new(999_999_999_999, 2), 2, 0).await;

    let settings = app.ctx.payment_settings();
    let uc = PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    };
    let err = uc.execute(user.id, &[line(pricey.id, 2)]).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(app.store.stock(pricey.id).await, Some(2));

    uc.execute(user.id, &[line(pricey.id, 1)]).await.unwrap();
}

#[tokio::test]
async fn webhook_trusts_the_provider_over_the_notification() {
    let app = TestApp::new(true);
    let gateway = app.gateway.clone().unwrap();
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let product = app.store.insert_product(1, Decimal::new(49900, 2), 2, 0).await;

    let settings = app.ctx.payment_settings();
    let uc = PlaceOrder {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
        settings: &settings,
    };
    let placed = uc.execute(user.id, &[line(product.id, 1)]).await.unwrap();
    assert!(!placed.order.payment_confirmed);
    let payment_id = placed.order.payment_id.clone().expect("payment attached");
    assert!(placed.payment_url.is_some());
    let request = gateway.requests.lock().await[0].clone();
    assert_eq!(request.amount, Decimal::new(49900, 2));
    assert_eq!(request.idempotence_key, format!("order-{}", placed.order.id));

    let handler = HandlePaymentNotification {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
    };
    let body = notification(&payment_id, "payment.succeeded", "succeeded", placed.order.id);

    // The provider still reports the payment as pending, so the claimed success is not trusted.
    assert_eq!(handler.execute(&body).await.unwrap(), NotificationOutcome::Ignored);
    let order = OrderRepository::get(app.store.as_ref(), placed.order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!order.payment_confirmed);
    assert_eq!(app.store.payment_event_count().await, 0);

    // Other events are stored once without touching the order.
    let waiting = notification(&payment_id, "payment.waiting_for_capture", "waiting_for_capture", placed.order.id);
    assert_eq!(handler.execute(&waiting).await.unwrap(), NotificationOutcome::Recorded);
    assert_eq!(handler.execute(&waiting).await.unwrap(), NotificationOutcome::Duplicate);

    // The rejected delivery did not burn the event: the genuine one still confirms.
    gateway.succeed(&payment_id).await;
    assert_eq!(handler.execute(&body).await.unwrap(), NotificationOutcome::Confirmed);
    assert_eq!(app.store.payment_event_count().await, 2);
}

#[tokio::test]
async fn succeeded_payment_is_confirmed_exactly_once() {
    let app = TestApp::new(true);
    let gateway = app.gateway.clone().unwrap();
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let product = app.store.insert_product(1, Decimal::new(1500, 2), 10, 0).await;

    let settings = app.ctx.payment_settings();
    let placed = PlaceOrder {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
        settings: &settings,
    }
    .execute(user.id, &[line(product.id, 3)])
    .await
    .unwrap();
    let payment_id = placed.order.payment_id.clone().unwrap();
    gateway.succeed(&payment_id).await;

    let handler = HandlePaymentNotification {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
    };
    let body = notification(&payment_id, "payment.succeeded", "succeeded", placed.order.id);
    assert_eq!(handler.execute(&body).await.unwrap(), NotificationOutcome::Confirmed);
    assert_eq!(handler.execute(&body).await.unwrap(), NotificationOutcome::Duplicate);
    assert_eq!(app.store.payment_event_count().await, 1);

    let order = OrderRepository::get(app.store.as_ref(), placed.order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(order.payment_confirmed);

    // A paid order cannot start another payment.
    let actor = Actor::new(user.id, UserRole::User);
    let err = StartPayment {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
        settings: &settings,
    }
    .execute(&actor, placed.order.id)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    assert!(matches!(
        handler.execute(b"{not json").await,
        Err(ServiceError::BadRequest(_))
    ));
}

#[tokio::test]
async fn provider_outage_leaves_the_order_unpaid_for_a_retry() {
    let app = TestApp::new(true);
    let gateway = app.gateway.clone().unwrap();
    gateway.fail_create.store(true, Ordering::SeqCst);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let product = app.store.insert_product(1, Decimal::new(1000, 2), 1, 0).await;

    let settings = app.ctx.payment_settings();
    let placed = PlaceOrder {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
        settings: &settings,
    }
    .execute(user.id, &[line(product.id, 1)])
    .await
    .unwrap();
    assert!(!placed.order.payment_confirmed);
    assert_eq!(placed.payment_url, None);

    let actor = Actor::new(user.id, UserRole::User);
    let retry = StartPayment {
        orders: app.store.as_ref(),
        gateway: Some(gateway.as_ref()),
        settings: &settings,
    };
    assert!(matches!(
        retry.execute(&actor, placed.order.id).await,
        Err(ServiceError::Upstream { .. })
    ));

    gateway.fail_create.store(false, Ordering::SeqCst);
    let payment = retry.execute(&actor, placed.order.id).await.unwrap();
    assert!(payment.confirmation_url.is_some());
    assert!(gateway.get_payment(&payment.id).await.unwrap().is_some());

    // Someone else's order is invisible.
    let stranger = Actor::new(user.id + 100, UserRole::User);
    assert!(matches!(
        retry.execute(&stranger, placed.order.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn status_moves_forward_only() {
    let app = TestApp::new(false);
    let (user, _) = app.user("buyer@example.com", UserRole::User).await;
    let product = app.store.insert_product(1, Decimal::new(1000, 2), 5, 0).await;
    let settings = app.ctx.payment_settings();
    let placed = PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    }
    .execute(user.id, &[line(product.id, 1)])
    .await
    .unwrap();

    let owner = Actor::new(user.id, UserRole::User);
    let uc = SetOrderStatus {
        orders: app.store.as_ref(),
    };
    let order = uc
        .execute(&owner, placed.order.id, OrderStatus::Delivery)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivery);
    assert!(matches!(
        uc.execute(&owner, placed.order.id, OrderStatus::Created).await,
        Err(ServiceError::Conflict(_))
    ));

    let stranger = Actor::new(user.id + 1, UserRole::User);
    assert!(uc
        .execute(&stranger, placed.order.id, OrderStatus::Closed)
        .await
        .is_err());
    let admin = Actor::new(user.id + 2, UserRole::Admin);
    let closed = uc
        .execute(&admin, placed.order.id, OrderStatus::Closed)
        .await
        .unwrap();
    assert_eq!(closed.status, OrderStatus::Closed);
}
