//! Keystone API Server
//!
//! Serves ledger audits over HTTP, reading from Postgres.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keystone_api::{AppState, create_router};
use keystone_core::audit::LedgerSource;
use keystone_db::{LedgerRepository, connect};
use keystone_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keystone=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().expect("Failed to load configuration");

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let ledger: Arc<dyn LedgerSource> = Arc::new(LedgerRepository::new(db));
    info!(
        page_size = config.audit.page_size,
        timeout_secs = config.audit.timeout_secs,
        "Audit engine configured"
    );

    let state = AppState {
        ledger,
        audit: config.audit.clone(),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
