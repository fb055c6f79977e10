//! Address Parser
//!
//! Turns a user-supplied repository address such as
//! `https://github.com/octocat/hello-world` into a [`RepositoryRef`].

use gradebook_core::domain::repository::RepositoryRef;
use thiserror::Error;

/// Marker that precedes `owner/repository` in an address
pub const HOST_MARKER: &str = "github.com/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address has no 'github.com/' marker: {0}")]
    MissingHost(String),

    #[error("address needs owner and repository after 'github.com/': {0}")]
    MissingSegments(String),
}

/// Parse an address into owner and repository name
///
/// Everything before the host marker is ignored. The first two non-empty path
/// segments after it become owner and name; anything further (`/tree/main`,
/// `/blob/...`) is ignored, as are query strings, fragments and a `.git` suffix.
pub fn parse_repository_address(address: &str) -> Result<RepositoryRef, AddressError> {
    let address = address.trim();
    let (_, rest) = address
        .split_once(HOST_MARKER)
        .ok_or_else(|| AddressError::MissingHost(address.to_string()))?;

    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let mut segments = rest.split('/').filter(|segment| !segment.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => {
            let name = name.strip_suffix(".git").unwrap_or(name);
            if name.is_empty() {
                return Err(AddressError::MissingSegments(address.to_string()));
            }
            Ok(RepositoryRef::new(owner, name))
        }
        _ => Err(AddressError::MissingSegments(address.to_string())),
    }
}
