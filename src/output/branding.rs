use std::path::PathBuf;

use tracing::{debug, warn};

/// Where the report logo comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BrandingSource {
    #[default]
    None,
    Url(String),
    FilePath(PathBuf),
    Inline(Vec<u8>),
}

impl BrandingSource {
    /// `http(s)://` values are URLs, anything else non-empty is a path.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::None;
        }
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::FilePath(crate::config::expand_tilde(trimmed))
        }
    }
}

/// One attempt, no retry. Every failure degrades to `None`.
pub async fn fetch_logo(client: &reqwest::Client, source: &BrandingSource) -> Option<Vec<u8>> {
    let bytes = match source {
        BrandingSource::None => return None,
        BrandingSource::Inline(bytes) => bytes.clone(),
        BrandingSource::FilePath(path) => match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("logo unavailable at {}: {e}", path.display());
                return None;
            }
        },
        BrandingSource::Url(url) => match fetch_url(client, url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("logo unavailable at {url}: {e}");
                return None;
            }
        },
    };
    if bytes.is_empty() {
        warn!("logo source returned no bytes");
        return None;
    }
    debug!(len = bytes.len(), "logo loaded");
    Some(bytes)
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("status {status}"));
    }
    let body = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(body.to_vec())
}
