use async_trait::async_trait;

use crate::domain::products::product::{
    NewProductImage, NewReview, Product, ProductDraft, ProductFilters, ProductImage,
    ProductReview, ReviewImage,
};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, id: i64) -> anyhow::Result<Option<Product>>;
    async fn filter(&self, filters: &ProductFilters) -> anyhow::Result<Vec<Product>>;
    async fn create(&self, draft: &ProductDraft) -> anyhow::Result<Product>;
    async fn update(&self, id: i64, draft: &ProductDraft) -> anyhow::Result<Option<Product>>;
    /// Deletes the product with its images, specifications and reviews.
    async fn delete(&self, id: i64) -> anyhow::Result<ProductDeletion>;

    async fn list_images(&self, product_id: i64) -> anyhow::Result<Vec<ProductImage>>;
    async fn get_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>>;
    /// The first image of a product always becomes primary; a new primary image demotes the others.
    async fn add_image(&self, image: &NewProductImage) -> anyhow::Result<ProductImage>;
    /// Promotes another image when the removed one was primary.
    async fn delete_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>>;

    async fn list_reviews(&self, product_id: i64) -> anyhow::Result<Vec<ProductReview>>;
    async fn get_review(&self, review_id: i64) -> anyhow::Result<Option<ProductReview>>;
    /// Inserts the review and refreshes the product's rating and review count atomically.
    async fn add_review(&self, review: &NewReview) -> anyhow::Result<ProductReview>;
    async fn add_review_image(&self, review_id: i64, url: &str) -> anyhow::Result<ReviewImage>;
}

#[derive(Debug, Clone)]
pub enum ProductDeletion {
    /// Carries the removed images so their stored objects can be cleaned up.
    Deleted(Vec<ProductImage>),
    NotFound,
    /// Order history still references the product.
    Ordered,
}
