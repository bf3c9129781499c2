//! Ranklens API server binary.

use ranklens_api::{ServerConfig, init_tracing, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::load()?;
    server::run(config).await
}
