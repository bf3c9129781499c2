//! Server wiring: configuration to listening socket.

use std::sync::Arc;

use ranklens_db::{Database, PgKeywordRowStore, PgSnapshotStore, PgWebsiteRepository};
use ranklens_engine::SeoEngine;
use ranklens_providers::{DataForSeo, DataForSeoConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::routes::build_app;
use crate::state::AppState;

/// Connect dependencies, run migrations and serve the API until shutdown.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let provider = DataForSeo::new(DataForSeoConfig {
        base_url: config.provider.base_url.clone(),
        login: config.provider.login.clone(),
        password: config.provider.password.clone(),
        ..DataForSeoConfig::default()
    })?;

    let engine = SeoEngine::new(
        Arc::new(PgWebsiteRepository::new(db.pool().clone())),
        Arc::new(PgSnapshotStore::new(db.pool().clone())),
        Arc::new(PgKeywordRowStore::new(db.pool().clone())),
        Arc::new(provider),
    );
    let state = Arc::new(AppState::new(Arc::new(engine)));

    let app = build_app(state);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "ranklens api listening");

    axum::serve(listener, app).await?;
    Ok(())
}
