use std::net::SocketAddr;
use std::sync::Arc;

use sheetquery::auth::{JwtConfig, TokenVerifier};
use sheetquery::config::ServerConfig;
use sheetquery::http::{AppState, router};
use sheetquery::storage::{DocumentStore, MemoryStore, TimeoutStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetquery=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: listen={}:{}, declared field types={}, store_timeout={:?}, auth={}",
        config.listen_host,
        config.listen_port,
        config.field_types.len(),
        config.store_timeout,
        config
            .jwt
            .as_ref()
            .map_or("disabled", JwtConfig::algorithm_name)
    );

    let memory = match &config.seed_file {
        Some(path) => MemoryStore::from_seed_file(path).unwrap_or_else(|e| {
            tracing::error!("Failed to load seed file: {e}");
            std::process::exit(1);
        }),
        None => MemoryStore::new(),
    };
    if let Ok(count) = memory.len() {
        tracing::info!("Document store ready with {count} documents");
    }
    let store: Arc<dyn DocumentStore> = Arc::new(TimeoutStore::new(memory, config.store_timeout));

    let verifier = match config.jwt.as_ref().map(TokenVerifier::new).transpose() {
        Ok(verifier) => verifier,
        Err(e) => {
            tracing::error!("Failed to build token verifier: {e}");
            std::process::exit(1);
        }
    };

    let addr = SocketAddr::from((config.listen_host, config.listen_port));
    let state = AppState::new(store, config.field_types, verifier);
    let app = router(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
