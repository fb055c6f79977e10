//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod check;
mod grade;
mod question;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Grade a roster against a reference solution
    Grade(grade::GradeArgs),
    /// Generate a problem statement from a source file
    Question {
        /// Path to the source file
        #[arg(short, long)]
        source: String,
    },
    /// Check whether a repository exists on the code host
    Check {
        /// `owner/repo` or a repository URL
        repository: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Grade(args) => grade::handle_grade_command(args, config).await,
        Commands::Question { source } => question::handle_question_command(&source, config).await,
        Commands::Check { repository } => check::handle_check_command(&repository, config).await,
    }
}
