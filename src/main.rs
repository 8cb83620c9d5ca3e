use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use market_api::application::ports::company_registry::CompanyRegistry;
use market_api::application::ports::file_store::FileStore;
use market_api::application::ports::mailer::Mailer;
use market_api::application::ports::payment_gateway::PaymentGateway;
use market_api::bootstrap::app_context::{AppContext, AppServices};
use market_api::bootstrap::config::{Config, StorageBackend};
use market_api::bootstrap::telemetry;
use market_api::infrastructure::db;
use market_api::infrastructure::db::repositories::{
    business_repository_sqlx::SqlxBusinessRepository, cart_repository_sqlx::SqlxCartRepository,
    order_repository_sqlx::SqlxOrderRepository, product_repository_sqlx::SqlxProductRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use market_api::infrastructure::mail::{LogMailer, SmtpMailer};
use market_api::infrastructure::payments::YookassaGateway;
use market_api::infrastructure::registry::DadataRegistry;
use market_api::infrastructure::storage::{FsFileStore, S3FileStore};
use market_api::presentation::http::build_router;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = Config::from_env()?;
    telemetry::init(cfg.is_production)?;
    info!(?cfg, "Starting market backend");

    let pool = db::connect_pool(&cfg.database_url, cfg.db_max_connections).await?;
    db::migrate(&pool).await?;

    let file_store: Arc<dyn FileStore> = match cfg.storage_backend {
        StorageBackend::Filesystem => {
            if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
                warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
            }
            Arc::new(FsFileStore::new(&cfg.uploads_dir, cfg.uploads_url_base()))
        }
        StorageBackend::S3 => Arc::new(S3FileStore::new(&cfg).await?),
    };

    let mailer: Arc<dyn Mailer> = match &cfg.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(
            &smtp.host,
            smtp.port,
            &smtp.username,
            &smtp.password,
            &smtp.from,
        )?),
        None => {
            warn!("SMTP is not configured, outgoing mail will only be logged");
            Arc::new(LogMailer::default())
        }
    };

    let payment_gateway: Option<Arc<dyn PaymentGateway>> = match &cfg.yookassa {
        Some(y) => Some(Arc::new(YookassaGateway::new(
            y.account_id.clone(),
            y.secret_key.clone(),
            y.api_url.clone(),
        ))),
        None => {
            warn!("payment provider is not configured, orders are marked paid on placement");
            None
        }
    };

    let company_registry: Option<Arc<dyn CompanyRegistry>> = cfg
        .dadata_token
        .clone()
        .map(|token| -> Arc<dyn CompanyRegistry> {
            Arc::new(DadataRegistry::new(token, cfg.dadata_url.clone()))
        });

    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxBusinessRepository::new(pool.clone())),
        Arc::new(SqlxProductRepository::new(pool.clone())),
        Arc::new(SqlxCartRepository::new(pool.clone())),
        Arc::new(SqlxOrderRepository::new(pool.clone())),
        mailer,
        file_store,
        payment_gateway,
        company_registry,
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let prometheus = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "prometheus recorder not installed, /api/metrics disabled");
            None
        }
    };

    let app = build_router(ctx, Some(pool.clone()), prometheus);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!(%addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    pool.close().await;
    Ok(())
}
