use anyhow::Result;
use debbie::{
    config::{Config, Environment},
    routes::{router, AppState},
    services::{MemoryStore, PaymentLedger, PromptStore, RedisStore, SiteApi},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting debbie v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    let (ledger, prompts) = connect_store(&config).await?;
    let site = Arc::new(SiteApi::new(&config.api_base_url)?);

    let app = router(AppState::new(ledger, prompts, site, &config.public_url));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Frame endpoint: http://{}/api/frame", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect_store(config: &Config) -> Result<(Arc<dyn PaymentLedger>, Arc<dyn PromptStore>)> {
    match RedisStore::connect(&config.kv_url, config.kv_token.as_deref()).await {
        Ok(store) => {
            let store = Arc::new(store);
            let ledger: Arc<dyn PaymentLedger> = store.clone();
            let prompts: Arc<dyn PromptStore> = store;
            Ok((ledger, prompts))
        }
        Err(e) if matches!(config.environment, Environment::Development) => {
            tracing::warn!("Redis unavailable ({:#}), using in-memory store", e);
            let store = Arc::new(MemoryStore::new());
            let ledger: Arc<dyn PaymentLedger> = store.clone();
            let prompts: Arc<dyn PromptStore> = store;
            Ok((ledger, prompts))
        }
        Err(e) => Err(e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
