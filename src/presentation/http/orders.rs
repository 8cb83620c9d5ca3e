use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::orders::list_orders::ListOrders;
use crate::application::use_cases::orders::place_order::PlaceOrder;
use crate::application::use_cases::orders::set_status::SetOrderStatus;
use crate::application::use_cases::orders::start_payment::StartPayment;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::telemetry::ORDERS_PLACED_TOTAL;
use crate::domain::orders::order::{Order, OrderDetails, OrderItem, OrderLine, OrderStatus};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiResult, ErrorBody};
use crate::presentation::http::products::ProductResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub order_id: i64,
    /// `created`, `delivery` or `closed`
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub payment_confirmed: bool,
    pub payment_id: Option<String>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            status: o.status.as_str().to_string(),
            payment_confirmed: o.payment_confirmed,
            payment_id: o.payment_id,
            total: o.total,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price paid.
    pub price: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrderResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    /// Where to send the buyer to pay; absent when no provider is configured or it failed.
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetailsResponse {
    #[serde(flatten)]
    pub item: OrderItemResponse,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailsResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemDetailsResponse>,
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(d: OrderDetails) -> Self {
        Self {
            order: d.order.into(),
            items: d
                .items
                .into_iter()
                .map(|i| OrderItemDetailsResponse {
                    item: i.item.into(),
                    product: i.product.into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub payment_id: String,
    pub status: String,
    pub payment_url: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/order", get(list_orders).post(place_order).put(set_status))
        .route("/order/:id/payment", post(start_payment))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/order", tag = "Orders", request_body = [OrderLineRequest],
    responses(
        (status = 201, body = PlacedOrderResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn place_order(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<Vec<OrderLineRequest>>,
) -> ApiResult<(StatusCode, Json<PlacedOrderResponse>)> {
    let lines: Vec<OrderLine> = req
        .into_iter()
        .map(|l| OrderLine {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();
    let orders = ctx.order_repo();
    let gateway = ctx.payment_gateway();
    let settings = ctx.payment_settings();
    let uc = PlaceOrder {
        orders: orders.as_ref(),
        gateway: gateway.as_deref(),
        settings: &settings,
    };
    let placed = uc.execute(actor.user_id, &lines).await?;
    counter!(ORDERS_PLACED_TOTAL).increment(1);
    let body = PlacedOrderResponse {
        order: placed.order.into(),
        items: placed.items.into_iter().map(Into::into).collect(),
        payment_url: placed.payment_url,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(get, path = "/api/order", tag = "Orders",
    responses((status = 200, body = [OrderDetailsResponse])))]
pub async fn list_orders(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<OrderDetailsResponse>>> {
    let repo = ctx.order_repo();
    let uc = ListOrders {
        orders: repo.as_ref(),
    };
    let orders = uc.execute(actor.user_id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(put, path = "/api/order", tag = "Orders", request_body = SetStatusRequest,
    responses(
        (status = 200, body = OrderResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn set_status(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let status = OrderStatus::parse(req.status.trim())
        .ok_or_else(|| ApiError::bad_request(format!("unknown order status {}", req.status)))?;
    let repo = ctx.order_repo();
    let uc = SetOrderStatus {
        orders: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, req.order_id, status).await?.into()))
}

#[utoipa::path(post, path = "/api/order/{id}/payment", tag = "Orders",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, body = PaymentResponse),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody),
        (status = 502, body = ErrorBody),
        (status = 503, body = ErrorBody)
    ))]
pub async fn start_payment(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<PaymentResponse>> {
    let orders = ctx.order_repo();
    let gateway = ctx.payment_gateway();
    let settings = ctx.payment_settings();
    let uc = StartPayment {
        orders: orders.as_ref(),
        gateway: gateway.as_deref(),
        settings: &settings,
    };
    let payment = uc.execute(&actor, id).await?;
    Ok(Json(PaymentResponse {
        payment_id: payment.id,
        status: payment.status,
        payment_url: payment.confirmation_url,
    }))
}
