//! Single-shot file downloads.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("fetch failed for {url}: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("fetch failed for {url}: HTTP {status}")]
  Status { url: String, status: reqwest::StatusCode },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Download `url` to the file at `dest`, creating parent directories.
///
/// Redirects are followed. A partially written file is removed on failure.
pub async fn download(url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
  info!(url = %url, dest = %dest.display(), "downloading");

  let write_err = |source| FetchError::Write {
    path: dest.to_path_buf(),
    source,
  };

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).await.map_err(write_err)?;
  }

  let mut response = reqwest::get(url).await.map_err(|source| FetchError::Request {
    url: url.to_string(),
    source,
  })?;

  if !response.status().is_success() {
    return Err(FetchError::Status {
      url: url.to_string(),
      status: response.status(),
    });
  }

  let mut file = fs::File::create(dest).await.map_err(write_err)?;
  let mut size: u64 = 0;

  let copied: Result<(), FetchError> = async {
    while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Request {
      url: url.to_string(),
      source,
    })? {
      file.write_all(&chunk).await.map_err(write_err)?;
      size += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)
  }
  .await;

  if let Err(e) = copied {
    drop(file);
    debug!(dest = %dest.display(), "removing partial download");
    let _ = fs::remove_file(dest).await;
    return Err(e);
  }

  info!(dest = %dest.display(), size, "download complete");
  Ok(dest.to_path_buf())
}
