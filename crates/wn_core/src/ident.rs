use sha2::{Digest, Sha256};
use url::Url;

/// Normalizes a URL for deduplication: trims whitespace, lowercases scheme and
/// host (via parsing), and drops a single trailing slash.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let mut normalized = match Url::parse(trimmed) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    };
    if normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Stable article identifier: SHA-256 hex digest of the normalized URL.
pub fn article_id_from_url(url: &str) -> String {
    format!("{:x}", Sha256::digest(normalize_url(url).as_bytes()))
}
