//! Check command handler

use anyhow::{Context, Result, anyhow};
use colored::*;
use gradebook_core::dto::repo::CheckRepo;

use crate::config::Config;

/// Handle the check command
pub async fn handle_check_command(repository: &str, config: &Config) -> Result<()> {
    let (owner, repo) = split_repository(repository)?;

    let status = config
        .client()
        .check_repo(CheckRepo {
            owner: owner.clone(),
            repo: repo.clone(),
        })
        .await
        .context("Failed to check repository")?;

    if status.exists {
        println!("{} {}/{} exists", "✓".green(), owner.bold(), repo.bold());
    } else {
        println!("{} {}/{} not found", "✗".red(), owner.bold(), repo.bold());
    }

    Ok(())
}

/// Accept `owner/repo` or any URL containing `github.com/owner/repo`
fn split_repository(input: &str) -> Result<(String, String)> {
    let input = input.trim();
    let tail = match input.find("github.com/") {
        Some(pos) => &input[pos + "github.com/".len()..],
        None => input,
    };

    let mut segments = tail
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) => Ok((
            owner.to_string(),
            repo.trim_end_matches(".git").to_string(),
        )),
        _ => Err(anyhow!("Expected owner/repo or a repository URL, got '{}'", input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_form() {
        let (owner, repo) = split_repository("ada/lovelace").unwrap();
        assert_eq!((owner.as_str(), repo.as_str()), ("ada", "lovelace"));
    }

    #[test]
    fn test_split_url() {
        let (owner, repo) = split_repository("https://github.com/ada/lovelace.git?tab=readme").unwrap();
        assert_eq!((owner.as_str(), repo.as_str()), ("ada", "lovelace"));
    }

    #[test]
    fn test_split_rejects_single_segment() {
        assert!(split_repository("https://github.com/ada").is_err());
        assert!(split_repository("").is_err());
    }
}
