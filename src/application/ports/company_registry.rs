use async_trait::async_trait;

/// Public register of legal entities, queried by taxpayer number.
#[async_trait]
pub trait CompanyRegistry: Send + Sync {
    async fn find_by_inn(&self, inn: &str) -> anyhow::Result<serde_json::Value>;
}
