use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use translation_service::{
    api,
    cache::TargetLangCache,
    config::Config,
    db::PgStore,
    provider::GoogleTranslateClient,
    service::TranslationService,
    store::{MemoryStore, TranslationStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_service=info".parse()?),
        )
        .init();

    info!("Starting translation service");

    let config = Config::from_env()?;

    let store: Arc<dyn TranslationStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
        None => {
            warn!("DATABASE_URL not set, translations will only live in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let translator = GoogleTranslateClient::new(&config)
        .context("Failed to build translation HTTP client")?;
    let cache = Arc::new(TargetLangCache::new());
    let service = TranslationService::new(Arc::new(translator), store, cache);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("✓ Listening on {}", addr);

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
