use chrono::Duration;
use dotenvy::dotenv;
use momentum::{
    config::{catalog, database, server::ServerConfig},
    errors::Result,
    remote,
    server::{self, AppContext, auth::SessionVerifier},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Commands older than this can no longer be redelivered by a client outbox.
const APPLIED_COMMAND_RETENTION_DAYS: i64 = 7;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (before tracing so RUST_LOG from it is honoured)
    dotenv().ok();

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load settings and the default catalog
    let server_config = ServerConfig::from_env()
        .inspect_err(|e| error!("Critical error loading server configuration: {e}"))?;
    let catalog = catalog::load_default_catalog()
        .inspect(|c| info!("Catalog loaded with {} categories", c.categories.len()))
        .inspect_err(|e| error!("Failed to load catalog: {e}"))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connected successfully."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;
    remote::prune_applied_commands(&db, Duration::days(APPLIED_COMMAND_RETENTION_DAYS)).await?;

    // 5. Serve
    let verifier = Arc::new(SessionVerifier::new(&server_config.session_secret));
    let app = server::router(AppContext::new(db, verifier, catalog));
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    info!("Listening on http://{}", server_config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
