use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use homefix::config::AppConfig;
use homefix::db;
use homefix::routes;
use homefix::services::storage::local::LocalBlobStore;
use homefix::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.api_token == "changeme" {
        tracing::warn!("API_TOKEN is not set, provider endpoints use the default token");
    }

    let blobs = LocalBlobStore::new(&config.upload_dir, &config.public_base_url);
    tracing::info!("storing uploads in {}", config.upload_dir);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        blobs: Box::new(blobs),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
