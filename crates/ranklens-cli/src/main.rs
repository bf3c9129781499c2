//! Ranklens CLI entrypoint.

use clap::Parser;

mod commands;
mod handlers;

use commands::{Commands, KeywordCommands};

#[derive(Parser)]
#[command(name = "ranklens")]
#[command(author, version, about = "Ranklens command-line interface", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => handlers::serve(port).await?,
        Commands::Keywords { command } => match command {
            KeywordCommands::Cleanup { json } => handlers::cleanup_keywords(json).await?,
        },
    }

    Ok(())
}
