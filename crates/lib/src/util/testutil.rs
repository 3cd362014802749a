//! Test utilities for buildjdk-lib.
//!
//! [`RecordingHost`] implements [`Host`] without touching the machine: it
//! records every call, tracks which paths "exist", and answers captured
//! commands from a fixed table. This lets tests drive Windows and macOS runs
//! from any OS.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveError, ArchiveFormat};
use crate::exec::{CommandEnv, CommandSpec, ExecError};
use crate::fetch::FetchError;
use crate::git::GitError;
use crate::host::Host;
use crate::platform::Os;

/// A single interaction with the host, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
  Run {
    cmd: String,
    cwd: Option<PathBuf>,
    env: CommandEnv,
  },
  Capture(String),
  Download {
    url: String,
    dest: PathBuf,
  },
  Extract {
    archive: PathBuf,
    format: ArchiveFormat,
    dest: PathBuf,
    strip: usize,
  },
  Clone {
    url: String,
    dest: PathBuf,
    depth: u32,
  },
  CreateDir(PathBuf),
  Remove(PathBuf),
}

pub struct RecordingHost {
  os: Os,
  env: HashMap<String, String>,
  captures: HashMap<String, String>,
  children: HashMap<PathBuf, PathBuf>,
  fail_on: Option<String>,
  existing: RefCell<BTreeSet<PathBuf>>,
  calls: RefCell<Vec<HostCall>>,
}

impl RecordingHost {
  pub fn new(os: Os) -> Self {
    Self {
      os,
      env: HashMap::new(),
      captures: HashMap::new(),
      children: HashMap::new(),
      fail_on: None,
      existing: RefCell::new(BTreeSet::new()),
      calls: RefCell::new(Vec::new()),
    }
  }

  pub fn with_env(mut self, name: &str, value: &str) -> Self {
    self.env.insert(name.to_string(), value.to_string());
    self
  }

  /// Answer `capture` of the command line `cmd` with `stdout`.
  pub fn with_capture(mut self, cmd: &str, stdout: &str) -> Self {
    self.captures.insert(cmd.to_string(), stdout.to_string());
    self
  }

  pub fn with_existing(self, path: impl Into<PathBuf>) -> Self {
    self.existing.borrow_mut().insert(path.into());
    self
  }

  pub fn with_child(mut self, dir: impl Into<PathBuf>, child: impl Into<PathBuf>) -> Self {
    self.children.insert(dir.into(), child.into());
    self
  }

  /// Make any `run` whose command line contains `needle` exit with status 1.
  pub fn failing_on(mut self, needle: &str) -> Self {
    self.fail_on = Some(needle.to_string());
    self
  }

  pub fn calls(&self) -> Vec<HostCall> {
    self.calls.borrow().clone()
  }

  /// Command lines passed to `run`, in order.
  pub fn commands(&self) -> Vec<String> {
    self
      .calls
      .borrow()
      .iter()
      .filter_map(|call| match call {
        HostCall::Run { cmd, .. } => Some(cmd.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn ran(&self, needle: &str) -> bool {
    self.commands().iter().any(|cmd| cmd.contains(needle))
  }

  fn record(&self, call: HostCall) {
    self.calls.borrow_mut().push(call);
  }

  fn mark_existing(&self, path: &Path) {
    self.existing.borrow_mut().insert(path.to_path_buf());
  }
}

impl Host for RecordingHost {
  fn os(&self) -> Os {
    self.os
  }

  fn env_var(&self, name: &str) -> Option<String> {
    self.env.get(name).cloned()
  }

  async fn run(&self, cmd: &CommandSpec, env: &CommandEnv) -> Result<(), ExecError> {
    let line = cmd.display();
    self.record(HostCall::Run {
      cmd: line.clone(),
      cwd: cmd.cwd.clone(),
      env: env.clone(),
    });
    match &self.fail_on {
      Some(needle) if line.contains(needle.as_str()) => Err(ExecError::Failed { cmd: line, code: Some(1) }),
      _ => Ok(()),
    }
  }

  async fn capture(&self, cmd: &CommandSpec, _env: &CommandEnv) -> Result<String, ExecError> {
    let line = cmd.display();
    self.record(HostCall::Capture(line.clone()));
    self
      .captures
      .get(&line)
      .cloned()
      .ok_or(ExecError::Failed { cmd: line, code: None })
  }

  async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
    self.record(HostCall::Download {
      url: url.to_string(),
      dest: dest.to_path_buf(),
    });
    self.mark_existing(dest);
    Ok(dest.to_path_buf())
  }

  fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path, strip: usize) -> Result<usize, ArchiveError> {
    self.record(HostCall::Extract {
      archive: archive.to_path_buf(),
      format,
      dest: dest.to_path_buf(),
      strip,
    });
    self.mark_existing(dest);
    Ok(1)
  }

  fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<PathBuf, GitError> {
    self.record(HostCall::Clone {
      url: url.to_string(),
      dest: dest.to_path_buf(),
      depth,
    });
    self.mark_existing(dest);
    Ok(dest.to_path_buf())
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    self.record(HostCall::CreateDir(path.to_path_buf()));
    self.mark_existing(path);
    Ok(())
  }

  fn remove_path(&self, path: &Path) -> io::Result<()> {
    self.record(HostCall::Remove(path.to_path_buf()));
    self.existing.borrow_mut().remove(path);
    Ok(())
  }

  fn first_child(&self, dir: &Path) -> io::Result<Option<PathBuf>> {
    Ok(self.children.get(dir).cloned())
  }

  fn exists(&self, path: &Path) -> bool {
    self.existing.borrow().contains(path)
  }

  fn find_file(&self, root: &Path, name: &str) -> Option<PathBuf> {
    self
      .existing
      .borrow()
      .iter()
      .find(|path| path.starts_with(root) && path.file_name().is_some_and(|f| f == name))
      .cloned()
  }
}
