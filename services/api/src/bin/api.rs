//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, DbAdapter, InMemoryStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{build_router, cors_layer, AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use timeformed_core::ports::CredentialHasher;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.to_string()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select Storage & Build the Shared AppState ---
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());
    let app_state = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.max_db_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            AppState::from_store(db_adapter, hasher)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown.");
            AppState::from_store(Arc::new(InMemoryStore::new()), hasher)
        }
    };

    // --- 3. Create the Web Router ---
    let cors = cors_layer(&config.cors_allowed_origin)?;
    let app = build_router(Arc::new(app_state), cors);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
