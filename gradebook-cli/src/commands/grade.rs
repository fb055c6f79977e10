//! Grade command handler
//!
//! Reads the reference solution, problem statement and roster from disk,
//! submits them in one batch and prints a per-entry report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use gradebook_core::domain::roster::{GradedEntry, RosterEntry};
use gradebook_core::dto::grade::GradeRosterRequest;

use crate::config::Config;

/// Arguments for `gradebook grade`
#[derive(Args)]
pub struct GradeArgs {
    /// Path to the reference solution
    #[arg(short, long)]
    reference: String,

    /// Path to a JSON array of roster entries (each with a `repoUrl`)
    #[arg(long)]
    roster: String,

    /// Path to the problem statement
    #[arg(short, long)]
    question: Option<String>,

    /// Print the raw JSON result instead of the report
    #[arg(long)]
    json: bool,
}

/// Handle the grade command
pub async fn handle_grade_command(args: GradeArgs, config: &Config) -> Result<()> {
    let reference_solution = read_file(&args.reference)?;
    if reference_solution.trim().is_empty() {
        bail!("Reference solution {} is empty", args.reference);
    }

    let problem_statement = match &args.question {
        Some(path) => read_file(path)?,
        None => String::new(),
    };

    let roster = load_roster(&args.roster)?;
    if roster.is_empty() {
        println!("{}", "Roster is empty, nothing to grade.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Grading {} roster entries...", roster.len()).dimmed()
    );

    let result = config
        .client()
        .grade_roster(GradeRosterRequest {
            reference_solution,
            roster,
            problem_statement,
        })
        .await
        .context("Failed to grade roster")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    for entry in &result.entries {
        print_graded_entry(entry);
    }

    let total: u32 = result.entries.iter().map(|e| u32::from(e.marks)).sum();
    let average = total as f64 / result.entries.len().max(1) as f64;
    println!(
        "{}",
        format!(
            "Graded {} entries, average {:.1}",
            result.entries.len(),
            average
        )
        .bold()
    );

    Ok(())
}

fn read_file(path: &str) -> Result<String> {
    fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {}", path))
}

fn load_roster(path: &str) -> Result<Vec<RosterEntry>> {
    let content = read_file(path)?;
    parse_roster(&content).with_context(|| format!("Failed to parse roster {}", path))
}

fn parse_roster(content: &str) -> Result<Vec<RosterEntry>> {
    let roster: Vec<RosterEntry> = serde_json::from_str(content)?;
    Ok(roster)
}

fn print_graded_entry(entry: &GradedEntry) {
    let label = match entry.entry.display_name() {
        Some(name) => name,
        None if entry.entry.repository_address.is_empty() => "(no repoUrl)",
        None => &entry.entry.repository_address,
    };

    println!(
        "  {} {}",
        colorize_marks(entry.marks),
        label.bold()
    );
    println!("      {}", entry.feedback);
    if let Some(url) = &entry.graded_file_url {
        println!("      {}", url.dimmed());
    }
    println!();
}

/// Colorize marks by band
fn colorize_marks(marks: u8) -> ColoredString {
    let text = format!("{:>3}/100", marks);
    match marks {
        80..=100 => text.green(),
        50..=79 => text.yellow(),
        _ => text.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster_keeps_identity_fields() {
        let roster = parse_roster(
            r#"[{"name": "Ada", "roll": 7, "repoUrl": "https://github.com/ada/lovelace"}]"#,
        )
        .unwrap();

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].repository_address, "https://github.com/ada/lovelace");
        assert_eq!(roster[0].display_name(), Some("Ada"));
        assert_eq!(roster[0].identity["roll"], 7);
    }

    #[test]
    fn test_parse_roster_rejects_non_array() {
        assert!(parse_roster(r#"{"repoUrl": "https://github.com/ada/lovelace"}"#).is_err());
    }
}
