pub mod list_orders;
pub mod place_order;
pub mod set_status;
pub mod start_payment;

use rust_decimal::Decimal;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::payment_gateway::PaymentGateway;
use crate::domain::orders::order::Order;
use crate::domain::payments::payment::{CreatedPayment, PaymentRequest};

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub return_url: String,
    pub currency: String,
}

/// Stable per order and per previous attempt, so a retried request never charges twice
/// while a payment that was abandoned can still be replaced.
pub fn payment_idempotence_key(order: &Order) -> String {
    match &order.payment_id {
        None => format!("order-{}", order.id),
        Some(previous) => format!("order-{}-after-{}", order.id, previous),
    }
}

pub(crate) async fn create_order_payment<O, G>(
    orders: &O,
    gateway: &G,
    settings: &PaymentSettings,
    order: &Order,
) -> ServiceResult<CreatedPayment>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    if order.total <= Decimal::ZERO {
        return Err(ServiceError::bad_request("order total must be positive"));
    }
    let request = PaymentRequest {
        order_id: order.id,
        amount: order.total,
        currency: settings.currency.clone(),
        description: format!("Заказ №{}", order.id),
        return_url: settings.return_url.clone(),
        idempotence_key: payment_idempotence_key(order),
    };
    let payment = gateway
        .create_payment(&request)
        .await
        .map_err(|e| ServiceError::upstream("payment provider request failed", e))?;
    orders.attach_payment(order.id, &payment.id).await?;
    tracing::info!(order_id = order.id, payment_id = %payment.id, "payment_created");
    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::order::OrderStatus;
    use chrono::Utc;

    #[test]
    fn idempotence_key_changes_only_after_a_recorded_attempt() {
        let now = Utc::now();
        let mut order = Order {
            id: 12,
            user_id: 1,
            status: OrderStatus::Created,
            payment_confirmed: false,
            payment_id: None,
            total: Decimal::new(1000, 2),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(payment_idempotence_key(&order), "order-12");
        assert_eq!(payment_idempotence_key(&order), "order-12");
        order.payment_id = Some("2d1f".into());
        assert_eq!(payment_idempotence_key(&order), "order-12-after-2d1f");
    }
}
