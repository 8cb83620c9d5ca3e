//! In-memory implementations of every port, shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use market_api::application::ports::business_repository::{
    BusinessDeletion, BusinessRepository, BusinessUpdate,
};
use market_api::application::ports::cart_repository::CartRepository;
use market_api::application::ports::company_registry::CompanyRegistry;
use market_api::application::ports::file_store::{FileArea, FileStore, StoredObject, Upload};
use market_api::application::ports::mailer::Mailer;
use market_api::application::ports::order_repository::{OrderRepository, PaymentEventOutcome};
use market_api::application::ports::payment_gateway::PaymentGateway;
use market_api::application::ports::product_repository::{ProductDeletion, ProductRepository};
use market_api::application::ports::user_repository::UserRepository;
use market_api::bootstrap::app_context::{AppContext, AppServices};
use market_api::bootstrap::config::Config;
use market_api::domain::businesses::business::{Business, BusinessPatch, NewBusiness};
use market_api::domain::cart::cart_item::{CartItem, CartLine};
use market_api::domain::orders::order::{
    Order, OrderDetails, OrderItem, OrderItemDetails, OrderLine, OrderStatus, PlaceOrderOutcome,
    merge_lines,
};
use market_api::domain::payments::payment::{
    CreatedPayment, PaymentRequest, ProviderPayment, STATUS_SUCCEEDED,
};
use market_api::domain::products::product::{
    NewProductImage, NewReview, Product, ProductCategory, ProductDraft, ProductFilters,
    ProductImage, ProductReview, ReviewImage, SortBy, max_amount,
};
use market_api::domain::users::user::{
    NewUser, User, UserProfilePatch, UserRole, VerificationCode,
};

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
    codes: Vec<VerificationCode>,
    businesses: BTreeMap<i64, Business>,
    members: BTreeSet<(i64, i64)>,
    products: BTreeMap<i64, Product>,
    reviews: BTreeMap<i64, ProductReview>,
    carts: BTreeMap<(i64, i64), i32>,
    orders: BTreeMap<i64, Order>,
    order_items: Vec<OrderItem>,
    payment_events: HashSet<(String, String)>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One store behind every repository port, so order placement can see carts and stock.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn set_role(&self, user_id: i64, role: UserRole) {
        if let Some(u) = self.state.lock().await.users.get_mut(&user_id) {
            u.role = role;
        }
    }

    pub async fn stock(&self, product_id: i64) -> Option<i32> {
        self.state
            .lock()
            .await
            .products
            .get(&product_id)
            .map(|p| p.quantity)
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn payment_event_count(&self) -> usize {
        self.state.lock().await.payment_events.len()
    }

    pub async fn insert_product(&self, business_id: i64, price: Decimal, quantity: i32, discount: i32) -> Product {
        let draft = ProductDraft {
            business_id,
            price,
            title: "Test product".into(),
            description: String::new(),
            quantity,
            discount,
            category: ProductCategory::Other,
            brand: None,
            sku: None,
            estimated_delivery: None,
            specifications: None,
        };
        ProductRepository::create(self, &draft)
            .await
            .expect("insert product")
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Option<User>> {
        let mut s = self.state.lock().await;
        if s.users.values().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let id = s.id();
        let created = User {
            id,
            name: user.name.clone(),
            patronymic: user.patronymic.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            date_of_birth: user.date_of_birth,
            is_email_verified: false,
            role: UserRole::User,
            created_at: now(),
            updated_at: now(),
        };
        s.users.insert(id, created.clone());
        Ok(Some(created))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let s = self.state.lock().await;
        Ok(s.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.state.lock().await.users.values().cloned().collect())
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: &UserProfilePatch,
    ) -> anyhow::Result<Option<User>> {
        let mut s = self.state.lock().await;
        let Some(user) = s.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(patronymic) = &patch.patronymic {
            user.patronymic = patronymic.clone();
        }
        if let Some(surname) = &patch.surname {
            user.surname = surname.clone();
        }
        if patch.date_of_birth.is_some() {
            user.date_of_birth = patch.date_of_birth;
        }
        user.updated_at = now();
        Ok(Some(user.clone()))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.users
            .get_mut(&id)
            .map(|u| u.password_hash = password_hash.to_string())
            .is_some())
    }

    async fn mark_email_verified(&self, id: i64) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.users
            .get_mut(&id)
            .map(|u| u.is_email_verified = true)
            .is_some())
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        s.members.retain(|(_, uid)| *uid != id);
        s.codes.retain(|c| c.user_id != id);
        Ok(s.users.remove(&id).is_some())
    }

    async fn store_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<VerificationCode> {
        let mut s = self.state.lock().await;
        let code = VerificationCode {
            id: s.id(),
            user_id,
            code_hash: code_hash.to_string(),
            sent_at: now(),
            expires_at,
        };
        s.codes.push(code.clone());
        Ok(code)
    }

    async fn find_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
    ) -> anyhow::Result<Option<VerificationCode>> {
        let s = self.state.lock().await;
        Ok(s.codes
            .iter()
            .filter(|c| c.user_id == user_id && c.code_hash == code_hash)
            .max_by_key(|c| c.id)
            .cloned())
    }

    async fn delete_verification_codes(&self, user_id: i64) -> anyhow::Result<u64> {
        let mut s = self.state.lock().await;
        let before = s.codes.len();
        s.codes.retain(|c| c.user_id != user_id);
        Ok((before - s.codes.len()) as u64)
    }
}

fn registration_taken(s: &State, except: Option<i64>, inn: i64, ogrn: Option<i64>) -> bool {
    s.businesses.values().any(|b| {
        Some(b.id) != except && (b.inn == inn || (ogrn.is_some() && b.ogrn == ogrn))
    })
}

#[async_trait]
impl BusinessRepository for MemoryStore {
    async fn create_for_user(
        &self,
        owner_user_id: i64,
        business: &NewBusiness,
    ) -> anyhow::Result<Option<Business>> {
        let mut s = self.state.lock().await;
        if registration_taken(&s, None, business.inn, business.ogrn) {
            return Ok(None);
        }
        let id = s.id();
        let created = Business {
            id,
            inn: business.inn,
            ogrn: business.ogrn,
            owner: business.owner.clone(),
            short_name: business.short_name.clone(),
            full_name: business.full_name.clone(),
            address: business.address.clone(),
            created_at: now(),
            updated_at: now(),
        };
        s.businesses.insert(id, created.clone());
        s.members.insert((id, owner_user_id));
        Ok(Some(created))
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Business>> {
        Ok(self.state.lock().await.businesses.get(&id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Business>> {
        Ok(self.state.lock().await.businesses.values().cloned().collect())
    }

    async fn update(&self, id: i64, patch: &BusinessPatch) -> anyhow::Result<BusinessUpdate> {
        let mut s = self.state.lock().await;
        let Some(mut business) = s.businesses.get(&id).cloned() else {
            return Ok(BusinessUpdate::NotFound);
        };
        patch.apply_to(&mut business);
        if registration_taken(&s, Some(id), business.inn, business.ogrn) {
            return Ok(BusinessUpdate::Duplicate);
        }
        business.updated_at = now();
        s.businesses.insert(id, business.clone());
        Ok(BusinessUpdate::Updated(business))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<BusinessDeletion> {
        let mut s = self.state.lock().await;
        if !s.businesses.contains_key(&id) {
            return Ok(BusinessDeletion::NotFound);
        }
        let product_ids: Vec<i64> = s
            .products
            .values()
            .filter(|p| p.business_id == id)
            .map(|p| p.id)
            .collect();
        if s.order_items.iter().any(|i| product_ids.contains(&i.product_id)) {
            return Ok(BusinessDeletion::Ordered);
        }
        let mut images = Vec::new();
        for product_id in &product_ids {
            if let Some(product) = s.products.remove(product_id) {
                images.extend(product.images);
            }
        }
        s.reviews.retain(|_, r| !product_ids.contains(&r.product_id));
        s.carts.retain(|(_, pid), _| !product_ids.contains(pid));
        s.members.retain(|(bid, _)| *bid != id);
        s.businesses.remove(&id);
        Ok(BusinessDeletion::Deleted(images))
    }

    async fn find_by_inn(&self, inn: i64) -> anyhow::Result<Option<Business>> {
        let s = self.state.lock().await;
        Ok(s.businesses.values().find(|b| b.inn == inn).cloned())
    }

    async fn find_by_ogrn(&self, ogrn: i64) -> anyhow::Result<Option<Business>> {
        let s = self.state.lock().await;
        Ok(s.businesses.values().find(|b| b.ogrn == Some(ogrn)).cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Business>> {
        let s = self.state.lock().await;
        Ok(s.members
            .iter()
            .filter(|(_, uid)| *uid == user_id)
            .filter_map(|(bid, _)| s.businesses.get(bid).cloned())
            .collect())
    }

    async fn list_members(&self, business_id: i64) -> anyhow::Result<Vec<User>> {
        let s = self.state.lock().await;
        Ok(s.members
            .iter()
            .filter(|(bid, _)| *bid == business_id)
            .filter_map(|(_, uid)| s.users.get(uid).cloned())
            .collect())
    }

    async fn add_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool> {
        Ok(self.state.lock().await.members.insert((business_id, user_id)))
    }

    async fn remove_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool> {
        Ok(self.state.lock().await.members.remove(&(business_id, user_id)))
    }

    async fn is_member(&self, user_id: i64, business_id: i64) -> anyhow::Result<bool> {
        Ok(self.state.lock().await.members.contains(&(business_id, user_id)))
    }
}

fn apply_draft(product: &mut Product, draft: &ProductDraft) {
    product.business_id = draft.business_id;
    product.price = draft.price;
    product.title = draft.title.clone();
    product.description = draft.description.clone();
    product.quantity = draft.quantity;
    product.discount = draft.discount;
    product.category = draft.category;
    product.brand = draft.brand.clone();
    product.sku = draft.sku.clone();
    product.estimated_delivery = draft.estimated_delivery.clone();
    if let Some(specs) = &draft.specifications {
        product.specifications = specs.clone();
    }
    product.updated_at = now();
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<Product>> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn filter(&self, filters: &ProductFilters) -> anyhow::Result<Vec<Product>> {
        let s = self.state.lock().await;
        let mut found: Vec<Product> = s
            .products
            .values()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();
        match filters.sort_by {
            SortBy::PriceAsc => found.sort_by(|a, b| a.price.cmp(&b.price).then(b.id.cmp(&a.id))),
            SortBy::PriceDesc => found.sort_by(|a, b| b.price.cmp(&a.price).then(b.id.cmp(&a.id))),
            SortBy::Rating => found.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(b.id.cmp(&a.id))),
            SortBy::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
            SortBy::Default => found.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(found
            .into_iter()
            .skip(filters.offset as usize)
            .take(filters.limit as usize)
            .collect())
    }

    async fn create(&self, draft: &ProductDraft) -> anyhow::Result<Product> {
        let mut s = self.state.lock().await;
        let id = s.id();
        let mut product = Product {
            id,
            business_id: draft.business_id,
            price: draft.price,
            title: String::new(),
            description: String::new(),
            quantity: 0,
            discount: 0,
            category: draft.category,
            brand: None,
            sku: None,
            estimated_delivery: None,
            rating: 0.0,
            review_count: 0,
            images: Vec::new(),
            specifications: Vec::new(),
            created_at: now(),
            updated_at: now(),
        };
        apply_draft(&mut product, draft);
        s.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> anyhow::Result<Option<Product>> {
        let mut s = self.state.lock().await;
        Ok(s.products.get_mut(&id).map(|p| {
            apply_draft(p, draft);
            p.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<ProductDeletion> {
        let mut s = self.state.lock().await;
        if !s.products.contains_key(&id) {
            return Ok(ProductDeletion::NotFound);
        }
        if s.order_items.iter().any(|i| i.product_id == id) {
            return Ok(ProductDeletion::Ordered);
        }
        s.reviews.retain(|_, r| r.product_id != id);
        s.carts.retain(|(_, pid), _| *pid != id);
        let product = s.products.remove(&id);
        Ok(ProductDeletion::Deleted(
            product.map(|p| p.images).unwrap_or_default(),
        ))
    }

    async fn list_images(&self, product_id: i64) -> anyhow::Result<Vec<ProductImage>> {
        let s = self.state.lock().await;
        Ok(s.products
            .get(&product_id)
            .map(|p| p.images.clone())
            .unwrap_or_default())
    }

    async fn get_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>> {
        let s = self.state.lock().await;
        Ok(s.products
            .values()
            .flat_map(|p| p.images.iter())
            .find(|i| i.id == image_id)
            .cloned())
    }

    async fn add_image(&self, image: &NewProductImage) -> anyhow::Result<ProductImage> {
        let mut s = self.state.lock().await;
        let id = s.id();
        let product = s
            .products
            .get_mut(&image.product_id)
            .ok_or_else(|| anyhow::anyhow!("product {} missing", image.product_id))?;
        let is_primary = image.is_primary || product.images.is_empty();
        if is_primary {
            product.images.iter_mut().for_each(|i| i.is_primary = false);
        }
        let stored = ProductImage {
            id,
            product_id: image.product_id,
            file_key: image.file_key.clone(),
            url: image.url.clone(),
            is_primary,
        };
        product.images.push(stored.clone());
        Ok(stored)
    }

    async fn delete_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>> {
        let mut s = self.state.lock().await;
        for product in s.products.values_mut() {
            if let Some(pos) = product.images.iter().position(|i| i.id == image_id) {
                let removed = product.images.remove(pos);
                if removed.is_primary {
                    if let Some(next) = product.images.iter_mut().min_by_key(|i| i.id) {
                        next.is_primary = true;
                    }
                }
                return Ok(Some(removed));
            }
        }
        Ok(None)
    }

    async fn list_reviews(&self, product_id: i64) -> anyhow::Result<Vec<ProductReview>> {
        let s = self.state.lock().await;
        Ok(s.reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn get_review(&self, review_id: i64) -> anyhow::Result<Option<ProductReview>> {
        Ok(self.state.lock().await.reviews.get(&review_id).cloned())
    }

    async fn add_review(&self, review: &NewReview) -> anyhow::Result<ProductReview> {
        let mut s = self.state.lock().await;
        let id = s.id();
        let created = ProductReview {
            id,
            product_id: review.product_id,
            user_id: review.user_id,
            rating: review.rating,
            text: review.text.clone(),
            created_at: now(),
            images: Vec::new(),
        };
        s.reviews.insert(id, created.clone());
        let ratings: Vec<f64> = s
            .reviews
            .values()
            .filter(|r| r.product_id == review.product_id)
            .map(|r| f64::from(r.rating))
            .collect();
        if let Some(product) = s.products.get_mut(&review.product_id) {
            product.review_count = ratings.len() as i64;
            product.rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
        }
        Ok(created)
    }

    async fn add_review_image(&self, review_id: i64, url: &str) -> anyhow::Result<ReviewImage> {
        let mut s = self.state.lock().await;
        let id = s.id();
        let review = s
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| anyhow::anyhow!("review {review_id} missing"))?;
        review.images.push(url.to_string());
        Ok(ReviewImage {
            id,
            review_id,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<CartLine>> {
        let s = self.state.lock().await;
        Ok(s.carts
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .filter_map(|((uid, pid), q)| {
                s.products.get(pid).map(|p| CartLine {
                    item: CartItem {
                        user_id: *uid,
                        product_id: *pid,
                        quantity: *q,
                    },
                    product: p.clone(),
                })
            })
            .collect())
    }

    async fn insert(&self, item: &CartItem) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        let key = (item.user_id, item.product_id);
        if s.carts.contains_key(&key) {
            return Ok(false);
        }
        s.carts.insert(key, item.quantity);
        Ok(true)
    }

    async fn remove(&self, user_id: i64, product_ids: &[i64]) -> anyhow::Result<u64> {
        let mut s = self.state.lock().await;
        let before = s.carts.len();
        s.carts
            .retain(|(uid, pid), _| !(*uid == user_id && product_ids.contains(pid)));
        Ok((before - s.carts.len()) as u64)
    }

    async fn set_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.carts
            .get_mut(&(user_id, product_id))
            .map(|q| *q = quantity)
            .is_some())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place_order(
        &self,
        user_id: i64,
        lines: &[OrderLine],
    ) -> anyhow::Result<PlaceOrderOutcome> {
        let mut s = self.state.lock().await;
        let lines = merge_lines(lines)?;
        // Check everything before writing anything.
        let mut checked_total = Decimal::ZERO;
        for line in &lines {
            let Some(product) = s.products.get(&line.product_id) else {
                return Ok(PlaceOrderOutcome::ProductMissing(line.product_id));
            };
            if product.quantity < line.quantity {
                return Ok(PlaceOrderOutcome::OutOfStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: product.quantity,
                });
            }
            checked_total += product.unit_price() * Decimal::from(line.quantity);
        }
        if checked_total.round_dp(2) > max_amount() {
            return Ok(PlaceOrderOutcome::TotalTooLarge);
        }
        let order_id = s.id();
        let mut total = Decimal::ZERO;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item_id = s.id();
            let product = s
                .products
                .get_mut(&line.product_id)
                .ok_or_else(|| anyhow::anyhow!("product vanished"))?;
            product.quantity = product
                .quantity
                .checked_sub(line.quantity)
                .ok_or_else(|| anyhow::anyhow!("stock underflow"))?;
            let price = product.unit_price();
            total += price * Decimal::from(line.quantity);
            items.push(OrderItem {
                id: item_id,
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price,
            });
        }
        let order = Order {
            id: order_id,
            user_id,
            status: OrderStatus::Created,
            payment_confirmed: false,
            payment_id: None,
            total: total.round_dp(2),
            created_at: now(),
            updated_at: now(),
        };
        s.orders.insert(order_id, order.clone());
        s.order_items.extend(items.iter().cloned());
        s.carts.retain(|(uid, pid), _| {
            !(*uid == user_id && lines.iter().any(|l| l.product_id == *pid))
        });
        Ok(PlaceOrderOutcome::Placed { order, items })
    }

    async fn get(&self, order_id: i64) -> anyhow::Result<Option<Order>> {
        Ok(self.state.lock().await.orders.get(&order_id).cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<OrderDetails>> {
        let s = self.state.lock().await;
        Ok(s.orders
            .values()
            .rev()
            .filter(|o| o.user_id == user_id)
            .map(|o| OrderDetails {
                order: o.clone(),
                items: s
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == o.id)
                    .filter_map(|i| {
                        s.products.get(&i.product_id).map(|p| OrderItemDetails {
                            item: i.clone(),
                            product: p.clone(),
                        })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn set_status(&self, order_id: i64, status: OrderStatus) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.orders
            .get_mut(&order_id)
            .map(|o| o.status = status)
            .is_some())
    }

    async fn attach_payment(&self, order_id: i64, payment_id: &str) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.orders
            .get_mut(&order_id)
            .map(|o| o.payment_id = Some(payment_id.to_string()))
            .is_some())
    }

    async fn mark_paid(&self, order_id: i64) -> anyhow::Result<bool> {
        let mut s = self.state.lock().await;
        Ok(s.orders
            .get_mut(&order_id)
            .map(|o| o.payment_confirmed = true)
            .is_some())
    }

    async fn record_payment_event(
        &self,
        payment_id: &str,
        event: &str,
        order_id: i64,
        confirm_order: bool,
    ) -> anyhow::Result<PaymentEventOutcome> {
        let mut s = self.state.lock().await;
        if !s.orders.contains_key(&order_id) {
            return Ok(PaymentEventOutcome::OrderMissing);
        }
        if !s
            .payment_events
            .insert((payment_id.to_string(), event.to_string()))
        {
            return Ok(PaymentEventOutcome::Duplicate);
        }
        if confirm_order {
            if let Some(order) = s.orders.get_mut(&order_id) {
                order.payment_confirmed = true;
                order.payment_id.get_or_insert_with(|| payment_id.to_string());
            }
        }
        Ok(PaymentEventOutcome::Applied)
    }
}

/// Keeps every message so tests can read verification codes and reset links.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub async fn last_to(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(rcpt, _, _)| rcpt == to)
            .map(|(_, _, body)| body.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), subject.to_string(), html_body.to_string()));
        Ok(())
    }
}

/// The six digit code from a verification email.
pub fn extract_code(html: &str) -> Option<String> {
    html.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 6)
        .map(str::to_string)
}

#[derive(Default)]
pub struct MemoryFileStore {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, area: FileArea, upload: Upload) -> anyhow::Result<StoredObject> {
        let mut objects = self.objects.lock().await;
        let key = format!("{}/{}", area.as_str(), objects.len() + 1);
        objects.insert(key.clone(), upload.bytes);
        Ok(StoredObject {
            url: format!("http://files.test/{key}"),
            key,
        })
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

/// Payment provider double. Payments it creates can be marked succeeded by the test.
#[derive(Default)]
pub struct FakeGateway {
    pub fail_create: std::sync::atomic::AtomicBool,
    pub requests: Mutex<Vec<PaymentRequest>>,
    pub payments: Mutex<BTreeMap<String, ProviderPayment>>,
}

impl FakeGateway {
    pub async fn succeed(&self, payment_id: &str) {
        if let Some(p) = self.payments.lock().await.get_mut(payment_id) {
            p.status = STATUS_SUCCEEDED.to_string();
            p.paid = true;
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> anyhow::Result<CreatedPayment> {
        if self.fail_create.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("provider unavailable");
        }
        self.requests.lock().await.push(request.clone());
        let id = format!("pay-{}", request.idempotence_key);
        self.payments.lock().await.insert(
            id.clone(),
            ProviderPayment {
                id: id.clone(),
                status: "pending".into(),
                paid: false,
                order_id: Some(request.order_id),
            },
        );
        Ok(CreatedPayment {
            id: id.clone(),
            status: "pending".into(),
            confirmation_url: Some(format!("https://pay.test/{id}")),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> anyhow::Result<Option<ProviderPayment>> {
        Ok(self.payments.lock().await.get(payment_id).cloned())
    }
}

pub struct FakeRegistry;

#[async_trait]
impl CompanyRegistry for FakeRegistry {
    async fn find_by_inn(&self, inn: &str) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::json!({ "suggestions": [{ "data": { "inn": inn } }] }))
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "FRONTEND_URL" => Some("http://shop.test".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub struct TestApp {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub files: Arc<MemoryFileStore>,
    pub gateway: Option<Arc<FakeGateway>>,
}

impl TestApp {
    pub fn new(with_gateway: bool) -> Self {
        let store = MemoryStore::new();
        let mailer = Arc::new(RecordingMailer::default());
        let files = Arc::new(MemoryFileStore::default());
        let gateway = with_gateway.then(|| Arc::new(FakeGateway::default()));
        let services = AppServices::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            mailer.clone(),
            files.clone(),
            gateway
                .clone()
                .map(|g| -> Arc<dyn PaymentGateway> { g }),
            Some(Arc::new(FakeRegistry) as Arc<dyn CompanyRegistry>),
        );
        let ctx = AppContext::new(test_config(), services);
        Self {
            ctx,
            store,
            mailer,
            files,
            gateway,
        }
    }

    /// Registers a user straight through the store and returns it with an access token.
    pub async fn user(&self, email: &str, role: UserRole) -> (User, String) {
        let new_user = NewUser {
            name: "Test".into(),
            patronymic: String::new(),
            surname: "User".into(),
            email: email.to_string(),
            password_hash: String::new(),
            date_of_birth: None,
        };
        let mut user = UserRepository::create_user(self.store.as_ref(), &new_user)
            .await
            .expect("create user")
            .expect("unique email");
        self.store.set_role(user.id, role).await;
        user.role = role;
        let token = self
            .ctx
            .jwt()
            .issue_pair(&user)
            .expect("issue tokens")
            .access_token;
        (user, token)
    }
}
