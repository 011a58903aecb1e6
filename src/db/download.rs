use std::path::Path;
use std::time::Duration;

use reqwest::Client;

use crate::Result;

/// Public snapshot published by the MWIApi project
pub const DEFAULT_DB_URL: &str = "https://raw.githubusercontent.com/holychikenz/MWIApi/main/market.db";

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Download the snapshot to `path` unless it already exists
///
/// Returns `true` when a download happened. The body is written next to
/// the target first and renamed into place, so a failed transfer never
/// leaves a truncated database behind. The partial file is removed on
/// failure.
pub async fn download_db_if_needed(url: &str, path: &Path, force: bool) -> Result<bool> {
    if !force && tokio::fs::try_exists(path).await? {
        tracing::debug!("Snapshot already present at {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tracing::info!("Downloading market snapshot from {}...", url);

    let client = Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()?;
    let body = client.get(url).send().await?.error_for_status()?.bytes().await?;

    let partial = path.with_extension("part");
    if let Err(e) = write_then_rename(&partial, path, &body).await {
        tokio::fs::remove_file(&partial).await.ok();
        return Err(e.into());
    }

    tracing::info!(
        "Download complete: {} bytes written to {}",
        body.len(),
        path.display()
    );

    Ok(true)
}

async fn write_then_rename(partial: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(partial, body).await?;
    tokio::fs::rename(partial, path).await
}
