use drinks_api::core::{AppState, Config, JwksCache, TokenValidator};
use drinks_api::create_router;
use drinks_api::repositories::DrinkRepository;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,drinks_api=debug,tower_http=debug")),
        )
        .init();

    // Inizializza la configurazione
    let config = Config::from_env()?;
    config.log_info();

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    info!("Database ready");

    if config.reset_database {
        DrinkRepository::new(pool.clone()).reset().await?;
    }

    let keys = JwksCache::remote(config.jwks_url.clone(), config.jwks_cache_ttl)?;
    let validator = TokenValidator::new(
        keys,
        &config.auth_issuer,
        &config.auth_audience,
        config.auth_algorithms.clone(),
    );

    let state = Arc::new(AppState::new(pool.clone(), validator));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
    }
    info!("Shutdown signal received");
}
