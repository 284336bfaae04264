//! Reading the README from disk or over HTTP.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, instrument};

use autodesc_shared::{AutoDescError, DocumentSource, Result};

/// User-Agent string for document fetches.
const USER_AGENT: &str = concat!("autodesc/", env!("CARGO_PKG_VERSION"));

/// Read the whole document as UTF-8 text.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_document(source: &DocumentSource, timeout_secs: u64) -> Result<String> {
    info!("loading {source}");

    match source {
        DocumentSource::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AutoDescError::io(path, e)),
        DocumentSource::Url(url) => {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| {
                    AutoDescError::Network(format!("failed to build HTTP client: {e}"))
                })?;

            let response = client
                .get(url.as_str())
                .send()
                .await
                .map_err(|e| AutoDescError::Network(format!("{url}: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AutoDescError::Network(format!("{url}: HTTP {status}")));
            }

            response
                .text()
                .await
                .map_err(|e| AutoDescError::Network(format!("{url}: failed to read body: {e}")))
        }
    }
}

/// Path of the document relative to the repository checkout.
///
/// Absolute paths are made relative to `root` when they live under it.
pub fn repository_relative(path: &Path, root: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        if let Some(relative) = root.and_then(|root| path.strip_prefix(root).ok()) {
            return relative.to_path_buf();
        }
    }
    path.to_path_buf()
}
