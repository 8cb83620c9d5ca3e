pub mod business_repository;
pub mod cart_repository;
pub mod company_registry;
pub mod file_store;
pub mod mailer;
pub mod order_repository;
pub mod payment_gateway;
pub mod product_repository;
pub mod user_repository;
