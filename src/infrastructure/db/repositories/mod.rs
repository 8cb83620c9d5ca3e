pub mod business_repository_sqlx;
pub mod cart_repository_sqlx;
pub mod order_repository_sqlx;
pub mod product_repository_sqlx;
pub mod user_repository_sqlx;
