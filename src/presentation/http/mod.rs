pub mod auth;
pub mod businesses;
pub mod cart;
pub mod error;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

use axum::Router;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use http::{HeaderValue, Method, header};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::{Config, StorageBackend};
use crate::infrastructure::db::PgPool;
use crate::presentation::http::middleware::RequestContext;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: message.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::ping,
        health::health,
        users::register,
        users::login,
        users::refresh,
        users::get_self,
        users::update_self,
        users::get_user,
        users::delete_user,
        users::list_users,
        users::get_user_by_email,
        users::verify_email,
        users::resend_verification,
        users::request_password_reset,
        users::reset_password,
        businesses::business_info,
        businesses::create_business,
        businesses::list_all,
        businesses::list_mine,
        businesses::get_business,
        businesses::get_by_inn,
        businesses::get_by_ogrn,
        businesses::update_business,
        businesses::delete_business,
        businesses::list_members,
        businesses::add_member,
        businesses::remove_member,
        products::search_products,
        products::categories,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_images,
        products::add_image,
        products::delete_image,
        products::upload_images,
        products::list_reviews,
        products::add_review,
        products::add_review_image,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::set_quantities,
        orders::place_order,
        orders::list_orders,
        orders::set_status,
        orders::start_payment,
        payments::notification,
    ),
    components(schemas(
        MessageResponse,
        error::ErrorBody,
        health::HealthResp,
        users::RegisterRequest,
        users::UpdateProfileRequest,
        users::UserResponse,
        users::TokenForm,
        users::RefreshForm,
        users::ResetPasswordForm,
        users::TokenResponse,
        businesses::CreateBusinessRequest,
        businesses::UpdateBusinessRequest,
        businesses::BusinessResponse,
        products::SpecificationDto,
        products::ProductImageResponse,
        products::ProductResponse,
        products::ProductRequest,
        products::CategoryResponse,
        products::ReviewRequest,
        products::ReviewResponse,
        products::ReviewImageResponse,
        products::UploadedImagesResponse,
        products::ImageUploadMultipart,
        products::BatchUploadMultipart,
        cart::AddToCartRequest,
        cart::CartItemResponse,
        cart::CartLineResponse,
        orders::OrderLineRequest,
        orders::SetStatusRequest,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::PlacedOrderResponse,
        orders::OrderItemDetailsResponse,
        orders::OrderDetailsResponse,
        orders::PaymentResponse,
        payments::NotificationAck,
    )),
    tags(
        (name = "Health", description = "System health checks"),
        (name = "Users", description = "Accounts, tokens, email verification and password reset"),
        (name = "Businesses", description = "Businesses and their members"),
        (name = "Products", description = "Catalogue, images and reviews"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Order placement and status"),
        (name = "Payments", description = "Payment provider notifications")
    )
)]
pub struct ApiDoc;

fn allowed_methods() -> [Method; 6] {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
    ]
}

/// Exact `FRONTEND_URL` origin when it parses; otherwise mirror the request in development
/// and allow nothing useful in production.
pub fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(allowed_methods())
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        _ if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

/// Full application router. `/health` is only mounted with a pool and `/metrics` only with
/// an installed recorder.
pub fn build_router(
    ctx: AppContext,
    pool: Option<PgPool>,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let cfg = ctx.cfg.clone();

    let mut api = Router::new()
        .merge(health::routes(pool))
        .merge(users::routes(ctx.clone()))
        .merge(businesses::routes(ctx.clone()))
        .merge(products::routes(ctx.clone()))
        .merge(cart::routes(ctx.clone()))
        .merge(orders::routes(ctx.clone()))
        .merge(payments::routes(ctx));
    if let Some(handle) = prometheus {
        api = api.merge(metrics::routes(handle));
    }
    if matches!(cfg.storage_backend, StorageBackend::Filesystem) {
        api = api.nest_service("/uploads", ServeDir::new(&cfg.uploads_dir));
    }

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(axum::middleware::from_fn(middleware::log_responses))
        .layer(cors_layer(&cfg))
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                let request_id = req
                    .extensions()
                    .get::<RequestContext>()
                    .map(|c| c.request_id.clone())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched, %request_id)
            }),
        )
        .layer(axum::middleware::from_fn(middleware::set_request_context))
}
