mod support;

use rust_decimal::Decimal;

use market_api::application::access::Actor;
use market_api::application::error::ServiceError;
use market_api::application::ports::business_repository::BusinessRepository;
use market_api::application::ports::file_store::Upload;
use market_api::application::ports::product_repository::ProductRepository;
use market_api::application::use_cases::businesses::create_business::CreateBusiness;
use market_api::application::use_cases::businesses::delete_business::DeleteBusiness;
use market_api::application::use_cases::orders::place_order::PlaceOrder;
use market_api::application::use_cases::products::add_product_image::AddProductImage;
use market_api::domain::businesses::business::NewBusiness;
use market_api::domain::orders::order::OrderLine;
use market_api::domain::users::user::UserRole;

use support::{FakeGateway, MemoryStore, TestApp};

fn company(inn: i64) -> NewBusiness {
    NewBusiness {
        inn,
        ogrn: None,
        owner: "Owner".into(),
        short_name: "Shop".into(),
        full_name: "Shop LLC".into(),
        address: None,
    }
}

fn png() -> Upload {
    Upload {
        file_name: Some("lamp.png".into()),
        content_type: Some("image/png".into()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn deleting_a_business_removes_its_products_and_images() {
    let app = TestApp::new(false);
    let (owner, _) = app.user("owner@example.com", UserRole::Business).await;
    let actor = Actor::new(owner.id, owner.role);
    let business = CreateBusiness {
        repo: app.store.as_ref(),
    }
    .execute(&actor, &company(7707083893))
    .await
    .unwrap();
    let product = app.store.insert_product(business.id, Decimal::new(1000, 2), 3, 0).await;
    let image = AddProductImage {
        products: app.store.as_ref(),
        businesses: app.store.as_ref(),
        files: app.files.as_ref(),
    }
    .execute(&actor, product.id, png(), true)
    .await
    .unwrap();
    assert!(app.files.objects.lock().await.contains_key(&image.file_key));

    let (stranger, _) = app.user("stranger@example.com", UserRole::User).await;
    let delete = DeleteBusiness {
        repo: app.store.as_ref(),
        files: app.files.as_ref(),
    };
    assert!(matches!(
        delete.execute(&Actor::new(stranger.id, stranger.role), business.id).await,
        Err(ServiceError::Forbidden(_))
    ));

    delete.execute(&actor, business.id).await.unwrap();
    assert!(BusinessRepository::get(app.store.as_ref(), business.id).await.unwrap().is_none());
    assert!(ProductRepository::get(app.store.as_ref(), product.id).await.unwrap().is_none());
    assert!(!app.files.objects.lock().await.contains_key(&image.file_key));

    assert!(matches!(
        delete.execute(&actor, business.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn business_with_ordered_products_cannot_be_deleted() {
    let app = TestApp::new(false);
    let (owner, _) = app.user("owner@example.com", UserRole::Business).await;
    let actor = Actor::new(owner.id, owner.role);
    let business = CreateBusiness {
        repo: app.store.as_ref(),
    }
    .execute(&actor, &company(7707083893))
    .await
    .unwrap();
    let product = app.store.insert_product(business.id, Decimal::new(1000, 2), 3, 0).await;

    let (buyer, _) = app.user("buyer@example.com", UserRole::User).await;
    let settings = app.ctx.payment_settings();
    PlaceOrder::<MemoryStore, FakeGateway> {
        orders: app.store.as_ref(),
        gateway: None,
        settings: &settings,
    }
    .execute(
        buyer.id,
        &[OrderLine {
            product_id: product.id,
            quantity: 1,
        }],
    )
    .await
    .unwrap();

    let delete = DeleteBusiness {
        repo: app.store.as_ref(),
        files: app.files.as_ref(),
    };
    assert!(matches!(
        delete.execute(&actor, business.id).await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(BusinessRepository::get(app.store.as_ref(), business.id).await.unwrap().is_some());
    assert_eq!(app.store.stock(product.id).await, Some(2));
}
