//! CLI command definitions.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server
    Serve {
        /// Port override (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage stored keyword rows
    Keywords {
        #[command(subcommand)]
        command: KeywordCommands,
    },
}

#[derive(Subcommand)]
pub enum KeywordCommands {
    /// Re-normalize stored keywords, repairing or deleting dirty rows
    Cleanup {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
