use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::use_cases::cart::add_to_cart::AddToCart;
use crate::application::use_cases::cart::get_cart::GetCart;
use crate::application::use_cases::cart::remove_from_cart::RemoveFromCart;
use crate::application::use_cases::cart::set_quantities::SetCartQuantities;
use crate::bootstrap::app_context::AppContext;
use crate::domain::cart::cart_item::{CartItem, CartLine};
use crate::presentation::http::MessageResponse;
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiResult, ErrorBody};
use crate::presentation::http::products::ProductResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: i64,
    pub quantity: i32,
}

impl From<CartItem> for CartItemResponse {
    fn from(i: CartItem) -> Self {
        Self {
            product_id: i.product_id,
            quantity: i.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub product_id: i64,
    pub quantity: i32,
    pub product: ProductResponse,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.item.product_id,
            quantity: line.item.quantity,
            product: line.product.into(),
        }
    }
}

fn to_lines(lines: Vec<CartLine>) -> Json<Vec<CartLineResponse>> {
    Json(lines.into_iter().map(Into::into).collect())
}

/// JSON object keys are strings; the cart is keyed by product id.
fn parse_quantities(raw: BTreeMap<String, i32>) -> Result<BTreeMap<i64, i32>, ApiError> {
    raw.into_iter()
        .map(|(k, v)| {
            k.trim()
                .parse::<i64>()
                .map(|id| (id, v))
                .map_err(|_| ApiError::bad_request(format!("invalid product id {k}")))
        })
        .collect()
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/cart",
            get(get_cart)
                .post(add_to_cart)
                .delete(remove_from_cart)
                .put(set_quantities),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/cart", tag = "Cart",
    responses((status = 200, body = [CartLineResponse])))]
pub async fn get_cart(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<CartLineResponse>>> {
    let repo = ctx.cart_repo();
    let uc = GetCart {
        carts: repo.as_ref(),
    };
    Ok(to_lines(uc.execute(actor.user_id).await?))
}

#[utoipa::path(post, path = "/api/cart", tag = "Cart", request_body = AddToCartRequest,
    responses((status = 201, body = CartItemResponse), (status = 404, body = ErrorBody), (status = 409, body = ErrorBody)))]
pub async fn add_to_cart(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartItemResponse>)> {
    req.validate()?;
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let uc = AddToCart {
        carts: carts.as_ref(),
        products: products.as_ref(),
    };
    let item = uc
        .execute(actor.user_id, req.product_id, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

#[utoipa::path(delete, path = "/api/cart", tag = "Cart", request_body = Vec<i64>,
    responses((status = 200, body = MessageResponse)))]
pub async fn remove_from_cart(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(product_ids): Json<Vec<i64>>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.cart_repo();
    let uc = RemoveFromCart {
        carts: repo.as_ref(),
    };
    let removed = uc.execute(actor.user_id, &product_ids).await?;
    Ok(Json(MessageResponse::ok(format!(
        "{removed} item(s) removed from cart"
    ))))
}

#[utoipa::path(put, path = "/api/cart", tag = "Cart",
    request_body(content = BTreeMap<String, i32>, description = "Quantities keyed by product id"),
    responses((status = 200, body = [CartLineResponse]), (status = 400, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn set_quantities(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(raw): Json<BTreeMap<String, i32>>,
) -> ApiResult<Json<Vec<CartLineResponse>>> {
    let quantities = parse_quantities(raw)?;
    let repo = ctx.cart_repo();
    let uc = SetCartQuantities {
        carts: repo.as_ref(),
    };
    Ok(to_lines(uc.execute(actor.user_id, &quantities).await?))
}

#[cfg(test)]
mod tests {
    use super::parse_quantities;
    use std::collections::BTreeMap;

    #[test]
    fn quantity_keys_must_be_product_ids() {
        let raw = BTreeMap::from([("7".to_string(), 2), (" 3".to_string(), 1)]);
        let parsed = parse_quantities(raw).unwrap();
        assert_eq!(parsed, BTreeMap::from([(3, 1), (7, 2)]));

        let raw = BTreeMap::from([("seven".to_string(), 2)]);
        assert!(parse_quantities(raw).is_err());
    }
}
