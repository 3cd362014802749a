//! External command execution.
//!
//! Commands never inherit changes made to this process: each invocation gets
//! an explicit working directory and a [`CommandEnv`] layered on top of the
//! environment the program was started with.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to start '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  #[error("command failed with {}: {cmd}", exit_status_text(*code))]
  Failed { cmd: String, code: Option<i32> },

  #[error("failed to assemble PATH: {0}")]
  JoinPaths(#[from] std::env::JoinPathsError),
}

fn exit_status_text(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// Environment additions accumulated over a run and applied to every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandEnv {
  /// Directories prepended to PATH, most recently added first.
  paths: Vec<PathBuf>,
  vars: BTreeMap<String, String>,
}

impl CommandEnv {
  pub fn new() -> Self {
    Self::default()
  }

  /// Prepend a directory to PATH for subsequent commands.
  pub fn add_path(&mut self, dir: impl Into<PathBuf>) {
    self.paths.insert(0, dir.into());
  }

  pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(name.into(), value.into());
  }

  /// Prepend `value` to a list-valued variable, keeping whatever it held before.
  pub fn prepend_var(&mut self, name: &str, value: &str) {
    let previous = self.var(name);
    let joined = match previous {
      Some(previous) if !previous.is_empty() => format!("{value}{}{previous}", list_separator()),
      _ => value.to_string(),
    };
    self.vars.insert(name.to_string(), joined);
  }

  /// Effective value of a variable: this run's override, else the inherited environment.
  pub fn var(&self, name: &str) -> Option<String> {
    self.vars.get(name).cloned().or_else(|| std::env::var(name).ok())
  }

  pub fn paths(&self) -> &[PathBuf] {
    &self.paths
  }

  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }

  /// PATH value with this run's additions in front of the inherited PATH.
  pub fn path_value(&self) -> Result<Option<OsString>, ExecError> {
    if self.paths.is_empty() {
      return Ok(None);
    }
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let joined = std::env::join_paths(self.paths.iter().cloned().chain(std::env::split_paths(&inherited)))?;
    Ok(Some(joined))
  }
}

#[cfg(unix)]
fn list_separator() -> char {
  ':'
}

#[cfg(windows)]
fn list_separator() -> char {
  ';'
}

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  /// Pass arguments to the program without re-quoting (Windows `cmd.exe /C`).
  #[serde(skip)]
  verbatim: bool,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      verbatim: false,
    }
  }

  /// Run `script` through the host's command interpreter.
  ///
  /// Uses `/bin/sh -c` on Unix and `cmd.exe /C` on Windows, so scripts may
  /// rely on `&&` chaining and redirection on either.
  pub fn shell(script: impl Into<String>) -> Self {
    let (program, flag) = shell_program();
    Self {
      program: program.to_string(),
      args: vec![flag.to_string(), script.into()],
      cwd: None,
      verbatim: cfg!(windows),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Human-readable command line for logs and error messages.
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn to_command(&self, env: &CommandEnv) -> Result<Command, ExecError> {
    let mut command = Command::new(&self.program);
    self.apply_args(&mut command);
    if let Some(cwd) = &self.cwd {
      command.current_dir(cwd);
    }
    if let Some(path) = env.path_value()? {
      command.env("PATH", path);
    }
    command.envs(env.vars());
    Ok(command)
  }

  #[cfg(windows)]
  fn apply_args(&self, command: &mut Command) {
    if self.verbatim {
      for arg in &self.args {
        command.raw_arg(arg);
      }
    } else {
      command.args(&self.args);
    }
  }

  #[cfg(not(windows))]
  fn apply_args(&self, command: &mut Command) {
    command.args(&self.args);
  }
}

#[cfg(unix)]
fn shell_program() -> (&'static str, &'static str) {
  ("/bin/sh", "-c")
}

#[cfg(windows)]
fn shell_program() -> (&'static str, &'static str) {
  ("cmd.exe", "/C")
}

/// Run a command with inherited stdio, streaming its output to the job log.
pub async fn run(spec: &CommandSpec, env: &CommandEnv) -> Result<(), ExecError> {
  let cmd = spec.display();
  info!(cmd = %cmd, cwd = ?spec.cwd, "executing command");

  let status = spec
    .to_command(env)?
    .stdin(Stdio::null())
    .status()
    .await
    .map_err(|source| ExecError::Spawn {
      cmd: cmd.clone(),
      source,
    })?;

  if !status.success() {
    return Err(ExecError::Failed {
      cmd,
      code: status.code(),
    });
  }
  Ok(())
}

/// Run a command and return its trimmed stdout.
pub async fn capture(spec: &CommandSpec, env: &CommandEnv) -> Result<String, ExecError> {
  let cmd = spec.display();
  debug!(cmd = %cmd, "capturing command output");

  let output = spec
    .to_command(env)?
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|source| ExecError::Spawn {
      cmd: cmd.clone(),
      source,
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    return Err(ExecError::Failed {
      cmd,
      code: output.status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Path of an executable inside `dir`, adding the platform suffix.
pub fn executable(dir: &Path, name: &str, exe_suffix: &str) -> PathBuf {
  dir.join(format!("{name}{exe_suffix}"))
}
