//! CLI command handlers.

use ranklens_api::{ServerConfig, server};
use ranklens_db::{Database, PgKeywordRowStore};
use ranklens_engine::run_keyword_cleanup;

/// Start the API server with the loaded configuration.
pub async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::load()?;
    if let Some(port) = port {
        config.port = port;
    }

    server::run(config).await
}

/// Run the keyword repair sweep against the configured database.
pub async fn cleanup_keywords(json: bool) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let store = PgKeywordRowStore::new(db.pool().clone());
    let report = run_keyword_cleanup(&store).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("websites scanned: {}", report.websites);
        println!("keywords scanned: {}", report.scanned);
        println!("repaired: {}", report.repaired);
        println!("deleted: {}", report.deleted);
    }

    Ok(())
}
