use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::order_repository::OrderRepository;
use crate::domain::orders::order::{Order, OrderStatus};

pub struct SetOrderStatus<'a, O: OrderRepository + ?Sized> {
    pub orders: &'a O,
}

impl<'a, O: OrderRepository + ?Sized> SetOrderStatus<'a, O> {
    pub async fn execute(
        &self,
        actor: &Actor,
        order_id: i64,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == actor.user_id || actor.is_admin())
            .ok_or_else(|| ServiceError::not_found("order not found"))?;
        if !order.status.can_transition_to(status) {
            return Err(ServiceError::conflict(format!(
                "cannot change order status from {} to {}",
                order.status.as_str(),
                status.as_str()
            )));
        }
        if order.status == status {
            return Ok(order);
        }
        if !self.orders.set_status(order_id, status).await? {
            return Err(ServiceError::not_found("order not found"));
        }
        tracing::info!(order_id, from = order.status.as_str(), to = status.as_str(), "order_status_changed");
        order.status = status;
        Ok(order)
    }
}
