use crate::application::error::ServiceResult;
use crate::application::ports::order_repository::OrderRepository;
use crate::domain::orders::order::OrderDetails;

pub struct ListOrders<'a, O: OrderRepository + ?Sized> {
    pub orders: &'a O,
}

impl<'a, O: OrderRepository + ?Sized> ListOrders<'a, O> {
    /// Newest first.
    pub async fn execute(&self, user_id: i64) -> ServiceResult<Vec<OrderDetails>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }
}
