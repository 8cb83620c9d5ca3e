use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::db::PgPool;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "Health",
    responses((status = 200, body = String, description = "pong"))
)]
pub async fn ping() -> &'static str {
    "pong"
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(pool): State<PgPool>) -> Json<HealthResp> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .is_ok();
    let status = if db_ok { "ok" } else { "degraded" };
    Json(HealthResp { status })
}

/// `/ping` always; `/health` only when a database pool is available.
pub fn routes(pool: Option<PgPool>) -> Router {
    let router = Router::new().route("/ping", get(ping));
    match pool {
        Some(pool) => router.merge(Router::new().route("/health", get(health)).with_state(pool)),
        None => router,
    }
}
