use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::payment_gateway::PaymentGateway;
use crate::application::use_cases::orders::{PaymentSettings, create_order_payment};
use crate::domain::orders::order::OrderStatus;
use crate::domain::payments::payment::CreatedPayment;

pub struct StartPayment<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub orders: &'a O,
    pub gateway: Option<&'a G>,
    pub settings: &'a PaymentSettings,
}

impl<'a, O, G> StartPayment<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, order_id: i64) -> ServiceResult<CreatedPayment> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == actor.user_id)
            .ok_or_else(|| ServiceError::not_found("order not found"))?;
        if order.payment_confirmed {
            return Err(ServiceError::conflict("order already paid"));
        }
        if order.status == OrderStatus::Closed {
            return Err(ServiceError::conflict("order is closed"));
        }
        let gateway = self
            .gateway
            .ok_or_else(|| ServiceError::Unavailable("payments are not configured".into()))?;
        create_order_payment(self.orders, gateway, self.settings, &order).await
    }
}
