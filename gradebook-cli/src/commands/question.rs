//! Question command handler

use std::fs;

use anyhow::{Context, Result, bail};
use colored::*;
use gradebook_core::dto::question::GenerateQuestion;

use crate::config::Config;

/// Handle the question command
pub async fn handle_question_command(source: &str, config: &Config) -> Result<()> {
    let code = fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?;
    if code.trim().is_empty() {
        bail!("Source file {} is empty", source);
    }

    let generated = config
        .client()
        .generate_question(GenerateQuestion { code })
        .await
        .context("Failed to generate question")?;

    println!("{}", "Generated question:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", generated.question);
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}
