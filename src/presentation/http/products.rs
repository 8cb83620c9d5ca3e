use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::ports::file_store::{FileArea, Upload};
use crate::application::use_cases::products::add_product_image::AddProductImage;
use crate::application::use_cases::products::add_review::AddReview;
use crate::application::use_cases::products::add_review_image::AddReviewImage;
use crate::application::use_cases::products::create_product::CreateProduct;
use crate::application::use_cases::products::delete_product::DeleteProduct;
use crate::application::use_cases::products::delete_product_image::DeleteProductImage;
use crate::application::use_cases::products::get_product::GetProduct;
use crate::application::use_cases::products::list_categories::list_categories;
use crate::application::use_cases::products::list_product_images::ListProductImages;
use crate::application::use_cases::products::list_reviews::ListReviews;
use crate::application::use_cases::products::search_products::SearchProducts;
use crate::application::use_cases::products::update_product::UpdateProduct;
use crate::application::use_cases::products::upload_images::UploadImages;
use crate::bootstrap::app_context::AppContext;
use crate::domain::products::product::{
    CategoryFilter, DEFAULT_PAGE_SIZE, Product, ProductCategory, ProductDraft, ProductFilters,
    ProductImage, ProductReview, ProductSpecification, ReviewImage, SortBy,
};
use crate::presentation::http::MessageResponse;
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiResult, ErrorBody};

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct SpecificationDto {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImageResponse {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub is_primary: bool,
}

impl From<ProductImage> for ProductImageResponse {
    fn from(i: ProductImage) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            url: i.url,
            is_primary: i.is_primary,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub business_id: i64,
    pub price: Decimal,
    /// Price per unit after the discount.
    pub final_price: Decimal,
    pub title: String,
    pub description: String,
    pub quantity: i32,
    pub discount: i32,
    pub category: String,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub estimated_delivery: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub images: Vec<ProductImageResponse>,
    pub specifications: Vec<SpecificationDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let final_price = p.unit_price();
        Self {
            id: p.id,
            business_id: p.business_id,
            price: p.price,
            final_price,
            title: p.title,
            description: p.description,
            quantity: p.quantity,
            discount: p.discount,
            category: p.category.as_str().to_string(),
            brand: p.brand,
            sku: p.sku,
            estimated_delivery: p.estimated_delivery,
            rating: p.rating,
            review_count: p.review_count,
            images: p.images.into_iter().map(Into::into).collect(),
            specifications: p
                .specifications
                .into_iter()
                .map(|s| SpecificationDto {
                    name: s.name,
                    value: s.value,
                })
                .collect(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    pub business_id: i64,
    pub price: Decimal,
    #[validate(length(min = 1, max = 255, message = "must be 1..255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub discount: i32,
    pub category: String,
    #[validate(length(max = 255))]
    pub brand: Option<String>,
    #[validate(length(max = 255))]
    pub sku: Option<String>,
    #[validate(length(max = 255))]
    pub estimated_delivery: Option<String>,
    pub specifications: Option<Vec<SpecificationDto>>,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft, ApiError> {
        let category = ProductCategory::parse(&self.category)
            .ok_or_else(|| ApiError::bad_request(format!("unknown category {}", self.category)))?;
        Ok(ProductDraft {
            business_id: self.business_id,
            price: self.price,
            title: self.title,
            description: self.description,
            quantity: self.quantity,
            discount: self.discount,
            category,
            brand: self.brand,
            sku: self.sku,
            estimated_delivery: self.estimated_delivery,
            specifications: self.specifications.map(|specs| {
                specs
                    .into_iter()
                    .map(|s| ProductSpecification {
                        name: s.name,
                        value: s.value,
                    })
                    .collect()
            }),
        })
    }
}

/// Catalogue query. List parameters are comma separated.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub search_query: Option<String>,
    /// e.g. `electronics,books`
    pub categories: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brands: Option<String>,
    pub rating: Option<f64>,
    pub in_stock: Option<bool>,
    pub on_sale: Option<bool>,
    /// `price-asc`, `price-desc`, `rating`, `newest`
    pub sort_by: Option<String>,
    pub business_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl ProductQuery {
    pub fn into_filters(self) -> Result<ProductFilters, ApiError> {
        let categories = split_list(self.categories.as_deref())
            .map(|c| {
                ProductCategory::parse(c)
                    .ok_or_else(|| ApiError::bad_request(format!("unknown category {c}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let brands = split_list(self.brands.as_deref())
            .map(str::to_string)
            .collect();
        let filters = ProductFilters {
            search_query: self
                .search_query
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            categories,
            min_price: self.min_price,
            max_price: self.max_price,
            brands,
            rating: self.rating,
            in_stock: self.in_stock.unwrap_or(false),
            on_sale: self.on_sale.unwrap_or(false),
            sort_by: self
                .sort_by
                .as_deref()
                .map(SortBy::parse)
                .unwrap_or_default(),
            business_id: self.business_id,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        };
        Ok(filters.clamp_page())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub title: String,
    pub image: String,
    pub link: String,
}

impl From<CategoryFilter> for CategoryResponse {
    fn from(c: CategoryFilter) -> Self {
        Self {
            id: c.id,
            title: c.title,
            image: c.image,
            link: c.link,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i16,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub rating: i16,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub images: Vec<String>,
}

impl From<ProductReview> for ReviewResponse {
    fn from(r: ProductReview) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            user_id: r.user_id,
            rating: r.rating,
            text: r.text,
            created_at: r.created_at,
            images: r.images,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewImageResponse {
    pub id: i64,
    pub review_id: i64,
    pub url: String,
}

impl From<ReviewImage> for ReviewImageResponse {
    fn from(i: ReviewImage) -> Self {
        Self {
            id: i.id,
            review_id: i.review_id,
            url: i.url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImagesResponse {
    pub urls: Vec<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadMultipart {
    /// Image file
    #[schema(value_type = String, format = Binary)]
    file: String,
    /// Make this the primary image
    is_primary: Option<bool>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BatchUploadMultipart {
    /// One or more `upload` image fields
    #[schema(value_type = Vec<String>, format = Binary)]
    upload: Vec<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/product", get(search_products).post(create_product))
        .route("/product/categories", get(categories))
        .route("/product/images/upload", post(upload_images))
        .route("/product/images/:image_id", delete(delete_image))
        .route("/product/reviews/:review_id/images", post(add_review_image))
        .route(
            "/product/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/product/:id/images", get(list_images).post(add_image))
        .route("/product/:id/reviews", get(list_reviews).post(add_review))
        .with_state(ctx)
}

struct ImageForm {
    upload: Option<Upload>,
    is_primary: bool,
}

async fn read_upload(
    field: axum::extract::multipart::Field<'_>,
    max_bytes: usize,
) -> Result<Upload, ApiError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?;
    if bytes.len() > max_bytes {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "file exceeds the upload limit",
        ));
    }
    Ok(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

async fn read_image_form(mut multipart: Multipart, max_bytes: usize) -> Result<ImageForm, ApiError> {
    let mut form = ImageForm {
        upload: None,
        is_primary: false,
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => form.upload = Some(read_upload(field, max_bytes).await?),
            Some("is_primary") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("invalid is_primary field"))?;
                form.is_primary = matches!(raw.trim(), "true" | "1" | "on");
            }
            _ => {}
        }
    }
    Ok(form)
}

#[utoipa::path(get, path = "/api/product", tag = "Products", params(ProductQuery),
    responses((status = 200, body = [ProductResponse]), (status = 400, body = ErrorBody)))]
pub async fn search_products(
    State(ctx): State<AppContext>,
    q: Option<Query<ProductQuery>>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let filters = q.map(|Query(q)| q).unwrap_or_default().into_filters()?;
    let repo = ctx.product_repo();
    let uc = SearchProducts {
        products: repo.as_ref(),
    };
    let items = uc.execute(filters).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/api/product/categories", tag = "Products",
    responses((status = 200, body = [CategoryResponse])))]
pub async fn categories() -> Json<Vec<CategoryResponse>> {
    Json(list_categories().into_iter().map(Into::into).collect())
}

#[utoipa::path(get, path = "/api/product/{id}", tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = ProductResponse), (status = 404, body = ErrorBody)))]
pub async fn get_product(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let repo = ctx.product_repo();
    let uc = GetProduct {
        products: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(post, path = "/api/product", tag = "Products", request_body = ProductRequest,
    responses((status = 201, body = ProductResponse), (status = 403, body = ErrorBody)))]
pub async fn create_product(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    req.validate()?;
    let draft = req.into_draft()?;
    let products = ctx.product_repo();
    let businesses = ctx.business_repo();
    let uc = CreateProduct {
        products: products.as_ref(),
        businesses: businesses.as_ref(),
    };
    let product = uc.execute(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

#[utoipa::path(put, path = "/api/product/{id}", tag = "Products", request_body = ProductRequest,
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = ProductResponse), (status = 403, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn update_product(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    req.validate()?;
    let draft = req.into_draft()?;
    let products = ctx.product_repo();
    let businesses = ctx.business_repo();
    let uc = UpdateProduct {
        products: products.as_ref(),
        businesses: businesses.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id, draft).await?.into()))
}

#[utoipa::path(delete, path = "/api/product/{id}", tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody), (status = 409, body = ErrorBody)))]
pub async fn delete_product(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let products = ctx.product_repo();
    let businesses = ctx.business_repo();
    let files = ctx.file_store();
    let uc = DeleteProduct {
        products: products.as_ref(),
        businesses: businesses.as_ref(),
        files: files.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(Json(MessageResponse::ok("product deleted")))
}

#[utoipa::path(get, path = "/api/product/{id}/images", tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = [ProductImageResponse]), (status = 404, body = ErrorBody)))]
pub async fn list_images(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ProductImageResponse>>> {
    let repo = ctx.product_repo();
    let uc = ListProductImages {
        products: repo.as_ref(),
    };
    let images = uc.execute(id).await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/product/{id}/images", tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    request_body(content = ImageUploadMultipart, content_type = "multipart/form-data"),
    responses((status = 201, body = ProductImageResponse), (status = 400, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn add_image(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ProductImageResponse>)> {
    let form = read_image_form(multipart, ctx.cfg.upload_max_bytes).await?;
    let upload = form
        .upload
        .ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let products = ctx.product_repo();
    let businesses = ctx.business_repo();
    let files = ctx.file_store();
    let uc = AddProductImage {
        products: products.as_ref(),
        businesses: businesses.as_ref(),
        files: files.as_ref(),
    };
    let image = uc.execute(&actor, id, upload, form.is_primary).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

#[utoipa::path(delete, path = "/api/product/images/{image_id}", tag = "Products",
    params(("image_id" = i64, Path, description = "Image id")),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody)))]
pub async fn delete_image(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(image_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let products = ctx.product_repo();
    let businesses = ctx.business_repo();
    let files = ctx.file_store();
    let uc = DeleteProductImage {
        products: products.as_ref(),
        businesses: businesses.as_ref(),
        files: files.as_ref(),
    };
    uc.execute(&actor, image_id).await?;
    Ok(Json(MessageResponse::ok("image deleted")))
}

#[utoipa::path(post, path = "/api/product/images/upload", tag = "Products",
    request_body(content = BatchUploadMultipart, content_type = "multipart/form-data"),
    responses((status = 201, body = UploadedImagesResponse), (status = 400, body = ErrorBody)))]
pub async fn upload_images(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedImagesResponse>)> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("upload") {
            uploads.push(read_upload(field, ctx.cfg.upload_max_bytes).await?);
        }
    }
    let files = ctx.file_store();
    let uc = UploadImages {
        files: files.as_ref(),
    };
    let stored = uc.execute(FileArea::Products, uploads).await?;
    let urls = stored.into_iter().map(|s| s.url).collect();
    Ok((StatusCode::CREATED, Json(UploadedImagesResponse { urls })))
}

#[utoipa::path(get, path = "/api/product/{id}/reviews", tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = [ReviewResponse]), (status = 404, body = ErrorBody)))]
pub async fn list_reviews(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    let repo = ctx.product_repo();
    let uc = ListReviews {
        products: repo.as_ref(),
    };
    let reviews = uc.execute(id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/product/{id}/reviews", tag = "Products", request_body = ReviewRequest,
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 201, body = ReviewResponse), (status = 400, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn add_review(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewResponse>)> {
    req.validate()?;
    let repo = ctx.product_repo();
    let uc = AddReview {
        products: repo.as_ref(),
    };
    let review = uc.execute(&actor, id, req.rating, &req.text).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

#[utoipa::path(post, path = "/api/product/reviews/{review_id}/images", tag = "Products",
    params(("review_id" = i64, Path, description = "Review id")),
    request_body(content = ImageUploadMultipart, content_type = "multipart/form-data"),
    responses((status = 201, body = ReviewImageResponse), (status = 403, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn add_review_image(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(review_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ReviewImageResponse>)> {
    let form = read_image_form(multipart, ctx.cfg.upload_max_bytes).await?;
    let upload = form
        .upload
        .ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let products = ctx.product_repo();
    let files = ctx.file_store();
    let uc = AddReviewImage {
        products: products.as_ref(),
        files: files.as_ref(),
    };
    let image = uc.execute(&actor, review_id, upload).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}
