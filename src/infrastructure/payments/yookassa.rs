use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::payment_gateway::PaymentGateway;
use crate::domain::payments::payment::{
    CreatedPayment, PaymentRequest, ProviderPayment, order_id_from_metadata,
};

pub const DEFAULT_API_URL: &str = "https://api.yookassa.ru/v3";

/// YooKassa REST client authenticated with shop id and secret key.
pub struct YookassaGateway {
    client: reqwest::Client,
    api_url: String,
    account_id: String,
    secret_key: String,
}

impl YookassaGateway {
    pub fn new(account_id: String, secret_key: String, api_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            account_id,
            secret_key,
        }
    }
}

#[derive(Serialize)]
struct Amount<'a> {
    value: String,
    currency: &'a str,
}

#[derive(Serialize)]
struct PaymentMethodData {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Confirmation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: &'a str,
}

#[derive(Serialize)]
struct CreatePaymentBody<'a> {
    amount: Amount<'a>,
    capture: bool,
    payment_method_data: PaymentMethodData,
    confirmation: Confirmation<'a>,
    description: &'a str,
    metadata: Value,
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    paid: bool,
    #[serde(default)]
    confirmation: Option<ConfirmationResponse>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Deserialize)]
struct ConfirmationResponse {
    #[serde(default)]
    confirmation_url: Option<String>,
}

fn create_body(request: &PaymentRequest) -> CreatePaymentBody<'_> {
    CreatePaymentBody {
        amount: Amount {
            value: format!("{:.2}", request.amount.round_dp(2)),
            currency: &request.currency,
        },
        capture: true,
        payment_method_data: PaymentMethodData { kind: "bank_card" },
        confirmation: Confirmation {
            kind: "redirect",
            return_url: &request.return_url,
        },
        description: &request.description,
        metadata: serde_json::json!({ "order_id": request.order_id.to_string() }),
    }
}

#[async_trait]
impl PaymentGateway for YookassaGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> anyhow::Result<CreatedPayment> {
        let resp = self
            .client
            .post(format!("{}/payments", self.api_url))
            .basic_auth(&self.account_id, Some(&self.secret_key))
            .header("Idempotence-Key", &request.idempotence_key)
            .json(&create_body(request))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("payment request failed: {e}"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("payment provider returned status {status}: {body}");
        }
        let payment: PaymentResponse = resp
            .json()
            .await
            .context("failed to decode payment provider response")?;
        tracing::info!(
            order_id = request.order_id,
            payment_id = %payment.id,
            status = %payment.status,
            "payment created"
        );
        Ok(CreatedPayment {
            id: payment.id,
            status: payment.status,
            confirmation_url: payment.confirmation.and_then(|c| c.confirmation_url),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> anyhow::Result<Option<ProviderPayment>> {
        let resp = self
            .client
            .get(format!(
                "{}/payments/{}",
                self.api_url,
                urlencoding::encode(payment_id)
            ))
            .basic_auth(&self.account_id, Some(&self.secret_key))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("payment lookup failed: {e}"))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("payment provider returned status {}", resp.status());
        }
        let payment: PaymentResponse = resp
            .json()
            .await
            .context("failed to decode payment provider response")?;
        Ok(Some(ProviderPayment {
            order_id: payment
                .metadata
                .as_ref()
                .and_then(|m| m.get("order_id"))
                .and_then(order_id_from_metadata),
            id: payment.id,
            status: payment.status,
            paid: payment.paid,
        }))
    }
}
