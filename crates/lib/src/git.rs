//! Shallow clone of the external build tool repository.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use gix::remote::fetch::Shallow;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GitError {
  #[error("clone destination already exists and is not empty: {}", .0.display())]
  DestinationExists(PathBuf),

  /// Failed to clone a git repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to check out the default branch after fetching.
  #[error("failed to checkout '{url}': {source}")]
  Checkout {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

/// Clone `url` into `dest`, fetching only the last `depth` commits of the default branch.
pub fn clone_shallow(url: &str, dest: &Path, depth: u32) -> Result<PathBuf, GitError> {
  if dest.read_dir().map(|mut d| d.next().is_some()).unwrap_or(false) {
    return Err(GitError::DestinationExists(dest.to_path_buf()));
  }

  info!(url, dest = %dest.display(), depth, "cloning repository");

  let clone_err = |e: Box<dyn std::error::Error + Send + Sync>| GitError::Clone {
    url: url.to_string(),
    source: e,
  };

  let mut prepared = gix::prepare_clone(url, dest).map_err(|e| clone_err(Box::new(e)))?;
  if let Some(depth) = NonZeroU32::new(depth) {
    prepared = prepared.with_shallow(Shallow::DepthAtRemote(depth));
  }

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  let (_repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| GitError::Checkout {
      url: url.to_string(),
      source: Box::new(e),
    })?;

  debug!(path = %dest.display(), "clone complete");
  Ok(dest.to_path_buf())
}
