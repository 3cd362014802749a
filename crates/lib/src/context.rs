//! CI runner context.
//!
//! Everything the run needs from the runner's environment is read once into a
//! [`RunnerContext`] and passed down explicitly. Outputs, exported variables
//! and PATH additions are written to the runner's command files
//! (`GITHUB_OUTPUT`, `GITHUB_ENV`, `GITHUB_PATH`) when they are configured.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::BUILD_TOOL_DIR;
use crate::platform::Os;

#[derive(Debug, Error)]
pub enum ContextError {
  #[error("failed to determine the current directory: {0}")]
  CurrentDir(#[source] std::io::Error),

  #[error("failed to write runner file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// Directories and command files provided by the CI runner.
#[derive(Debug, Clone)]
pub struct RunnerContext {
  /// Root under which staging directories and the build tool checkout live.
  pub workspace: PathBuf,
  /// Scratch directory for downloads and source builds.
  pub temp_dir: PathBuf,
  pub output_file: Option<PathBuf>,
  pub env_file: Option<PathBuf>,
  pub path_file: Option<PathBuf>,
}

impl RunnerContext {
  /// Context with no runner command files. Outputs fall back to workflow commands on stdout.
  pub fn new(workspace: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
    Self {
      workspace: workspace.into(),
      temp_dir: temp_dir.into(),
      output_file: None,
      env_file: None,
      path_file: None,
    }
  }

  /// Read the context from the runner environment.
  ///
  /// `GITHUB_WORKSPACE` falls back to the current directory and `RUNNER_TEMP`
  /// to a per-OS default under the user's base directory.
  pub fn from_env(os: Os) -> Result<Self, ContextError> {
    let workspace = match non_empty_var("GITHUB_WORKSPACE") {
      Some(dir) => PathBuf::from(dir),
      None => std::env::current_dir().map_err(ContextError::CurrentDir)?,
    };
    let workspace = dunce::canonicalize(&workspace).unwrap_or(workspace);

    let temp_dir = non_empty_var("RUNNER_TEMP")
      .map(PathBuf::from)
      .unwrap_or_else(|| default_temp_dir(os, non_empty_var("USERPROFILE")));

    Ok(Self {
      workspace,
      temp_dir,
      output_file: non_empty_var("GITHUB_OUTPUT").map(PathBuf::from),
      env_file: non_empty_var("GITHUB_ENV").map(PathBuf::from),
      path_file: non_empty_var("GITHUB_PATH").map(PathBuf::from),
    })
  }

  pub fn jdk_dir(&self) -> PathBuf {
    self.workspace.join("jdk")
  }

  /// Extraction target for a downloaded boot JDK on Unix-like hosts.
  pub fn boot_dir(&self) -> PathBuf {
    self.jdk_dir().join("boot")
  }

  /// Extraction target for the legacy JDK 8 bootstrap.
  pub fn home_dir(&self) -> PathBuf {
    self.jdk_dir().join("home")
  }

  /// Checkout of the external build tool.
  pub fn build_tool_dir(&self) -> PathBuf {
    self.workspace.join(BUILD_TOOL_DIR)
  }

  /// Publish a named run output.
  pub fn set_output(&self, name: &str, value: &str) -> Result<(), ContextError> {
    debug!(name, value, "setting output");
    match &self.output_file {
      Some(path) => append_line(path, &format!("{name}={value}")),
      None => {
        println!("::set-output name={}::{}", escape_property(name), escape_data(value));
        Ok(())
      }
    }
  }

  /// Export a variable to later steps of the job.
  pub fn export_variable(&self, name: &str, value: &str) -> Result<(), ContextError> {
    debug!(name, value, "exporting variable");
    match &self.env_file {
      Some(path) => append_line(path, &format!("{name}={value}")),
      None => Ok(()),
    }
  }

  /// Add a directory to PATH for later steps of the job.
  pub fn add_path(&self, dir: &Path) -> Result<(), ContextError> {
    debug!(dir = %dir.display(), "adding to PATH");
    match &self.path_file {
      Some(path) => append_line(path, &dir.display().to_string()),
      None => Ok(()),
    }
  }
}

/// Per-OS fallback for `RUNNER_TEMP`: `<base>/actions/temp`.
pub fn default_temp_dir(os: Os, user_profile: Option<String>) -> PathBuf {
  let base = match os {
    Os::Windows => PathBuf::from(user_profile.unwrap_or_else(|| "C:\\".to_string())),
    Os::Mac => PathBuf::from("/Users"),
    Os::Linux => PathBuf::from("/home"),
  };
  base.join("actions").join("temp")
}

/// Escape a workflow command message (`%`, CR and LF).
pub fn escape_data(value: &str) -> String {
  value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property, which additionally reserves `:` and `,`.
pub fn escape_property(value: &str) -> String {
  escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Format a failure as an `::error::` workflow command.
pub fn error_command(message: &str) -> String {
  format!("::error::{}", escape_data(message))
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn append_line(path: &Path, line: &str) -> Result<(), ContextError> {
  let write = || -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
  };
  write().map_err(|source| ContextError::WriteFile {
    path: path.to_path_buf(),
    source,
  })
}
