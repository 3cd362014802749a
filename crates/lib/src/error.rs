//! Error types for a build run.
//!
//! Each primitive (`exec`, `fetch`, `archive`, `git`, `context`) has its own
//! error. [`StepError`] unifies them for a single step, and [`BuildError`]
//! says which phase of the run failed.

use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::context::ContextError;
use crate::exec::ExecError;
use crate::fetch::FetchError;
use crate::git::GitError;
use crate::request::RequestError;

/// Failure of a single host interaction.
#[derive(Debug, Error)]
pub enum StepError {
  #[error(transparent)]
  Exec(#[from] ExecError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Archive(#[from] ArchiveError),

  #[error(transparent)]
  Git(#[from] GitError),

  #[error(transparent)]
  Context(#[from] ContextError),

  #[error("{op} {}: {source}", path.display())]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("directory {} is empty", .0.display())]
  EmptyDirectory(PathBuf),
}

impl StepError {
  pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      op,
      path: path.into(),
      source,
    }
  }
}

/// Terminal failure of a run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Request(#[from] RequestError),

  #[error("failed to create staging directory: {0}")]
  Stage(#[source] StepError),

  #[error("failed to install dependencies: {0}")]
  Dependency(#[source] StepError),

  #[error("failed to acquire boot JDK: {0}")]
  BootJdk(#[source] StepError),

  #[error("build failed and {0}")]
  Build(#[source] StepError),

  #[error("build failed and the build tool checkout is missing at {}", .0.display())]
  BuildToolMissing(PathBuf),

  #[error("build failed and {name} was not found under {}", root.display())]
  ArchiveNotFound { name: String, root: PathBuf },

  #[error("verification failed: java binary not found at {}", .0.display())]
  JavaMissing(PathBuf),

  #[error("verification failed: {0}")]
  Verify(#[source] StepError),
}
