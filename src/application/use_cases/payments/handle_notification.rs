use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::order_repository::{OrderRepository, PaymentEventOutcome};
use crate::application::ports::payment_gateway::PaymentGateway;
use crate::domain::payments::payment::{
    EVENT_PAYMENT_SUCCEEDED, PaymentNotification, STATUS_SUCCEEDED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The order's payment was confirmed by this delivery.
    Confirmed,
    /// A non-success event was stored without touching the order.
    Recorded,
    /// This `(payment, event)` pair was already processed.
    Duplicate,
    /// Nothing to attach the event to.
    Ignored,
}

pub struct HandlePaymentNotification<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub orders: &'a O,
    pub gateway: Option<&'a G>,
}

impl<'a, O, G> HandlePaymentNotification<'a, O, G>
where
    O: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub async fn execute(&self, body: &[u8]) -> ServiceResult<NotificationOutcome> {
        let notification =
            PaymentNotification::parse(body).map_err(|e| ServiceError::bad_request(e.to_string()))?;

        // With a configured provider its own view of the payment is authoritative.
        let (status, order_id) = match self.gateway {
            Some(gateway) => {
                let payment = gateway
                    .get_payment(&notification.payment_id)
                    .await
                    .map_err(|e| ServiceError::upstream("payment provider request failed", e))?
                    .ok_or_else(|| ServiceError::bad_request("unknown payment"))?;
                (payment.status, payment.order_id)
            }
            None => (notification.status.clone(), notification.order_id),
        };

        let Some(order_id) = order_id else {
            tracing::info!(payment_id = %notification.payment_id, event = %notification.event, "payment_notification_without_order");
            return Ok(NotificationOutcome::Ignored);
        };

        let claims_success = notification.event == EVENT_PAYMENT_SUCCEEDED;
        let confirm = claims_success && status == STATUS_SUCCEEDED;
        if claims_success && !confirm {
            // Not recorded, so the genuine success event can still confirm the order later.
            tracing::warn!(order_id, payment_id = %notification.payment_id, status = %status, "payment_success_not_confirmed_by_provider");
            return Ok(NotificationOutcome::Ignored);
        }
        let outcome = self
            .orders
            .record_payment_event(&notification.payment_id, &notification.event, order_id, confirm)
            .await?;
        let result = match outcome {
            PaymentEventOutcome::Applied if confirm => NotificationOutcome::Confirmed,
            PaymentEventOutcome::Applied => NotificationOutcome::Recorded,
            PaymentEventOutcome::Duplicate => NotificationOutcome::Duplicate,
            PaymentEventOutcome::OrderMissing => {
                tracing::warn!(order_id, payment_id = %notification.payment_id, "payment_notification_for_unknown_order");
                NotificationOutcome::Ignored
            }
        };
        tracing::info!(
            order_id,
            payment_id = %notification.payment_id,
            event = %notification.event,
            outcome = ?result,
            "payment_notification_processed"
        );
        Ok(result)
    }
}
