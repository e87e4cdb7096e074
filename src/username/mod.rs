//! Username normalization and short-link resolution
//!
//! Raw user input becomes a canonical lowercase handle before it is used
//! anywhere; listing URLs and cache keys are both built from it. Input
//! that looks like a `boxd.it` share link is resolved upstream first by
//! following its redirect to the profile it points at.

use crate::{ReelError, Result};
use reqwest::Client;

/// Normalizes raw input into a canonical username.
///
/// Trims whitespace, strips one leading `@`, and lowercases. Anything
/// outside lowercase letters, digits, and underscores is rejected.
pub fn normalize_username(raw: &str) -> Result<String> {
    let stripped = raw.trim();
    let stripped = stripped.strip_prefix('@').unwrap_or(stripped);
    let lowered = stripped.to_lowercase();

    let valid = !lowered.is_empty()
        && lowered
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(ReelError::InvalidUsername(raw.to_string()));
    }
    Ok(lowered)
}

/// Whether the input looks like a share short link rather than a handle
pub fn is_short_link(raw: &str) -> bool {
    raw.contains("boxd.it/")
}

/// Resolves raw input into a canonical username, following a short link
/// upstream when given one
pub async fn resolve_user(client: &Client, raw: &str) -> Result<String> {
    if is_short_link(raw) {
        resolve_short_link(client, raw).await
    } else {
        normalize_username(raw)
    }
}

/// Follows a short link's redirect and extracts the username from the
/// final profile URL
pub async fn resolve_short_link(client: &Client, link: &str) -> Result<String> {
    let url = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    };

    tracing::debug!("resolving short link {}", url);
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(ReelError::ShortLink {
            link: link.to_string(),
            reason: format!("unexpected status {}", response.status()),
        });
    }

    let segment = response
        .url()
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or("")
        .to_string();
    if segment.is_empty() {
        return Err(ReelError::ShortLink {
            link: link.to_string(),
            reason: "resolved URL carries no username".to_string(),
        });
    }
    normalize_username(&segment)
}
