use async_trait::async_trait;

use crate::domain::orders::order::{
    Order, OrderDetails, OrderLine, OrderStatus, PlaceOrderOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventOutcome {
    Applied,
    Duplicate,
    OrderMissing,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically checks and decrements stock, creates the order with its items
    /// priced at the current unit price, and removes the ordered products from
    /// the user's cart. Nothing is written unless every step succeeds.
    async fn place_order(
        &self,
        user_id: i64,
        lines: &[OrderLine],
    ) -> anyhow::Result<PlaceOrderOutcome>;
    async fn get(&self, order_id: i64) -> anyhow::Result<Option<Order>>;
    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<OrderDetails>>;
    async fn set_status(&self, order_id: i64, status: OrderStatus) -> anyhow::Result<bool>;
    async fn attach_payment(&self, order_id: i64, payment_id: &str) -> anyhow::Result<bool>;
    async fn mark_paid(&self, order_id: i64) -> anyhow::Result<bool>;
    /// Records `(payment_id, event)` once. When `confirm_order` is set and the
    /// event is new, the order's payment flag is raised in the same transaction.
    async fn record_payment_event(
        &self,
        payment_id: &str,
        event: &str,
        order_id: i64,
        confirm_order: bool,
    ) -> anyhow::Result<PaymentEventOutcome>;
}
