use rust_decimal::Decimal;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::payment_gateway::PaymentGateway;
use crate::application::use_cases::orders::{PaymentSettings, create_order_payment};
use crate::domain::orders::order::{Order, OrderItem, OrderLine, PlaceOrderOutcome, merge_lines};

pub struct PlaceOrder<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub orders: &'a O,
    pub gateway: Option<&'a G>,
    pub settings: &'a PaymentSettings,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment_url: Option<String>,
}

impl<'a, O, G> PlaceOrder<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub async fn execute(&self, user_id: i64, lines: &[OrderLine]) -> ServiceResult<PlacedOrder> {
        let lines = merge_lines(lines).map_err(|e| ServiceError::bad_request(e.to_string()))?;

        let (mut order, items) = match self.orders.place_order(user_id, &lines).await? {
            PlaceOrderOutcome::Placed { order, items } => (order, items),
            PlaceOrderOutcome::ProductMissing(product_id) => {
                return Err(ServiceError::not_found(format!(
                    "product {product_id} not found"
                )));
            }
            PlaceOrderOutcome::OutOfStock {
                product_id,
                requested,
                available,
            } => {
                return Err(ServiceError::conflict(format!(
                    "product {product_id}: requested {requested}, only {available} in stock"
                )));
            }
            PlaceOrderOutcome::TotalTooLarge => {
                return Err(ServiceError::bad_request("order total is too large"));
            }
        };
        tracing::info!(order_id = order.id, user_id, total = %order.total, "order_placed");

        let mut payment_url = None;
        match self.gateway {
            Some(gateway) if order.total > Decimal::ZERO => {
                // The order is committed; a provider failure leaves it unpaid for a retry.
                match create_order_payment(self.orders, gateway, self.settings, &order).await {
                    Ok(payment) => {
                        order.payment_id = Some(payment.id);
                        payment_url = payment.confirmation_url;
                    }
                    Err(e) => {
                        tracing::warn!(order_id = order.id, error = %e, "payment_start_failed");
                    }
                }
            }
            _ => {
                self.orders.mark_paid(order.id).await?;
                order.payment_confirmed = true;
            }
        }

        Ok(PlacedOrder {
            order,
            items,
            payment_url,
        })
    }
}
