use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use crate::application::ports::company_registry::CompanyRegistry;

pub const DEFAULT_URL: &str =
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/findById/party";

pub struct DadataRegistry {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl DadataRegistry {
    pub fn new(token: String, url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            token,
        }
    }
}

#[derive(Serialize)]
struct FindByIdRequest<'a> {
    query: &'a str,
    branch_type: &'static str,
}

#[async_trait]
impl CompanyRegistry for DadataRegistry {
    async fn find_by_inn(&self, inn: &str) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
            .json(&FindByIdRequest {
                query: inn,
                branch_type: "MAIN",
            })
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("registry request failed: {e}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("registry returned status {}", resp.status());
        }
        resp.json()
            .await
            .context("failed to decode registry response")
    }
}
