//! Gradebook CLI
//!
//! Command-line interface for interacting with the grading server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Grade rosters of code submissions against a reference solution", long_about = None)]
struct Cli {
    /// Grading server URL
    #[arg(
        long,
        env = "GRADEBOOK_SERVER_URL",
        default_value = "http://localhost:5000"
    )]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
