use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use metrics::counter;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::payments::handle_notification::{
    HandlePaymentNotification, NotificationOutcome,
};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::telemetry::PAYMENT_NOTIFICATIONS_TOTAL;
use crate::presentation::http::error::{ApiError, ApiResult, ErrorBody};

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationAck {
    pub status: &'static str,
    /// `confirmed`, `recorded`, `duplicate` or `ignored`
    pub outcome: &'static str,
}

fn outcome_label(outcome: NotificationOutcome) -> &'static str {
    match outcome {
        NotificationOutcome::Confirmed => "confirmed",
        NotificationOutcome::Recorded => "recorded",
        NotificationOutcome::Duplicate => "duplicate",
        NotificationOutcome::Ignored => "ignored",
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/payment/notifications", post(notification))
        .with_state(ctx)
}

/// Provider webhook. Redeliveries are acknowledged with 200 so the provider stops retrying.
#[utoipa::path(post, path = "/api/payment/notifications", tag = "Payments",
    request_body(content = Object, description = "Provider notification `{type, event, object}`"),
    security(()),
    responses(
        (status = 200, body = NotificationAck),
        (status = 400, body = ErrorBody),
        (status = 502, body = ErrorBody)
    ))]
pub async fn notification(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> ApiResult<Json<NotificationAck>> {
    let orders = ctx.order_repo();
    let gateway = ctx.payment_gateway();
    let uc = HandlePaymentNotification {
        orders: orders.as_ref(),
        gateway: gateway.as_deref(),
    };
    let outcome = match uc.execute(&body).await {
        Ok(outcome) => outcome_label(outcome),
        Err(e) => {
            let err = ApiError::from(e);
            counter!(PAYMENT_NOTIFICATIONS_TOTAL, "outcome" => "error").increment(1);
            return Err(err);
        }
    };
    counter!(PAYMENT_NOTIFICATIONS_TOTAL, "outcome" => outcome).increment(1);
    Ok(Json(NotificationAck {
        status: "ok",
        outcome,
    }))
}
