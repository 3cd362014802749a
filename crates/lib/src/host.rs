//! The seam between derivation logic and the machine it runs on.
//!
//! Every step of a run touches the host only through [`Host`]. [`SystemHost`]
//! performs the real work; tests drive the same code with a recording host.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::{self, ArchiveError, ArchiveFormat};
use crate::exec::{self, CommandEnv, CommandSpec, ExecError};
use crate::fetch::{self, FetchError};
use crate::git::{self, GitError};
use crate::platform::Os;

#[allow(async_fn_in_trait)]
pub trait Host {
  /// Operating system the run targets.
  fn os(&self) -> Os;

  /// Read a variable from the environment the program was started with.
  fn env_var(&self, name: &str) -> Option<String>;

  /// Run a command, streaming its output.
  async fn run(&self, cmd: &CommandSpec, env: &CommandEnv) -> Result<(), ExecError>;

  /// Run a command and return its trimmed stdout.
  async fn capture(&self, cmd: &CommandSpec, env: &CommandEnv) -> Result<String, ExecError>;

  async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError>;

  fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path, strip: usize) -> Result<usize, ArchiveError>;

  fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<PathBuf, GitError>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Remove a file or directory tree. Missing paths are not an error.
  fn remove_path(&self, path: &Path) -> io::Result<()>;

  /// First entry of `dir` in name order, if any.
  fn first_child(&self, dir: &Path) -> io::Result<Option<PathBuf>>;

  fn exists(&self, path: &Path) -> bool;

  /// Search `root` recursively for a file named `name`.
  fn find_file(&self, root: &Path, name: &str) -> Option<PathBuf>;
}

/// Host backed by the real process, network and filesystem.
#[derive(Debug, Clone, Copy)]
pub struct SystemHost {
  os: Os,
}

impl SystemHost {
  pub fn new() -> Self {
    Self { os: Os::current() }
  }
}

impl Default for SystemHost {
  fn default() -> Self {
    Self::new()
  }
}

impl Host for SystemHost {
  fn os(&self) -> Os {
    self.os
  }

  fn env_var(&self, name: &str) -> Option<String> {
    std::env::var(name).ok()
  }

  async fn run(&self, cmd: &CommandSpec, env: &CommandEnv) -> Result<(), ExecError> {
    exec::run(cmd, env).await
  }

  async fn capture(&self, cmd: &CommandSpec, env: &CommandEnv) -> Result<String, ExecError> {
    exec::capture(cmd, env).await
  }

  async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
    fetch::download(url, dest).await
  }

  fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path, strip: usize) -> Result<usize, ArchiveError> {
    archive::extract(archive, format, dest, strip)
  }

  fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<PathBuf, GitError> {
    git::clone_shallow(url, dest, depth)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
  }

  fn remove_path(&self, path: &Path) -> io::Result<()> {
    let result = match std::fs::symlink_metadata(path) {
      Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
      Ok(_) => std::fs::remove_file(path),
      Err(e) => Err(e),
    };
    match result {
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }

  fn first_child(&self, dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
      .map(|entry| entry.map(|e| e.path()))
      .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries.into_iter().next())
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn find_file(&self, root: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
      .into_iter()
      .filter_map(Result::ok)
      .find(|entry| entry.file_type().is_file() && entry.file_name() == name)
      .map(|entry| entry.into_path())
  }
}
