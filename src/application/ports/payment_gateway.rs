use async_trait::async_trait;

use crate::domain::payments::payment::{CreatedPayment, PaymentRequest, ProviderPayment};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest) -> anyhow::Result<CreatedPayment>;
    async fn get_payment(&self, payment_id: &str) -> anyhow::Result<Option<ProviderPayment>>;
}
