//! OS-level dependency installation.
//!
//! Installation is expressed as a plan of [`Step`]s built by [`plan`] and then
//! executed in order by [`install`]. Any failing step aborts the run; nothing
//! already installed is rolled back.

mod plan;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

pub use plan::{LinuxHost, plan};

use crate::archive::ArchiveFormat;
use crate::context::RunnerContext;
use crate::error::StepError;
use crate::exec::{CommandEnv, CommandSpec};
use crate::host::Host;
use crate::platform::Os;
use crate::request::BuildRequest;

/// One installation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
  /// Shell command, optionally in a given directory.
  Run { command: String, cwd: Option<PathBuf> },
  Download { url: String, dest: PathBuf },
  ExtractZip { archive: PathBuf, dest: PathBuf },
  ExtractTarGz { archive: PathBuf, dest: PathBuf },
  CreateDir { path: PathBuf },
  Remove { path: PathBuf },
  /// Put a directory on PATH for the rest of the run and later job steps.
  AddPath { dir: PathBuf },
  /// Put the first entry of `dir` on PATH. Used when an archive unpacks into a versioned directory.
  AddFirstChildToPath { dir: PathBuf },
  PrependEnv { name: String, value: String },
  LogPath,
}

impl Step {
  pub fn run(command: impl Into<String>) -> Self {
    Self::Run {
      command: command.into(),
      cwd: None,
    }
  }

  pub fn run_in(command: impl Into<String>, cwd: &Path) -> Self {
    Self::Run {
      command: command.into(),
      cwd: Some(cwd.to_path_buf()),
    }
  }

  pub fn download(url: &str, dest: &Path) -> Self {
    Self::Download {
      url: url.to_string(),
      dest: dest.to_path_buf(),
    }
  }

  pub fn remove(path: &Path) -> Self {
    Self::Remove {
      path: path.to_path_buf(),
    }
  }
}

/// Read the Ubuntu release of a Linux host.
///
/// Hosts without `lsb_release` are treated as not being Ubuntu 16.04.
pub async fn probe_linux<H: Host>(host: &H, env: &CommandEnv) -> LinuxHost {
  if host.os() != Os::Linux {
    return LinuxHost::default();
  }

  let cmd = CommandSpec::new("lsb_release").args(["-r", "-s"]);
  match host.capture(&cmd, env).await {
    Ok(release) => {
      debug!(release = %release, "detected distribution release");
      LinuxHost {
        ubuntu_release: Some(release),
      }
    }
    Err(e) => {
      warn!(error = %e, "could not read distribution release");
      LinuxHost::default()
    }
  }
}

/// Install everything the build needs on this host.
pub async fn install<H: Host>(
  host: &H,
  ctx: &RunnerContext,
  request: &BuildRequest,
  env: &mut CommandEnv,
) -> Result<(), StepError> {
  let linux_host = probe_linux(host, env).await;
  let steps = plan(host.os(), request.variant, &request.target, &linux_host, &ctx.temp_dir);

  info!(os = %host.os(), variant = %request.variant, steps = steps.len(), "installing dependencies");
  for step in &steps {
    execute_step(host, ctx, env, step).await?;
  }
  Ok(())
}

pub async fn execute_step<H: Host>(
  host: &H,
  ctx: &RunnerContext,
  env: &mut CommandEnv,
  step: &Step,
) -> Result<(), StepError> {
  match step {
    Step::Run { command, cwd } => {
      let mut cmd = CommandSpec::shell(command.as_str());
      if let Some(cwd) = cwd {
        cmd = cmd.current_dir(cwd);
      }
      host.run(&cmd, env).await?;
    }
    Step::Download { url, dest } => {
      host.download(url, dest).await?;
    }
    Step::ExtractZip { archive, dest } => {
      host.extract(archive, ArchiveFormat::Zip, dest, 0)?;
    }
    Step::ExtractTarGz { archive, dest } => {
      host.extract(archive, ArchiveFormat::TarGz, dest, 0)?;
    }
    Step::CreateDir { path } => {
      host
        .create_dir_all(path)
        .map_err(|e| StepError::io("create directory", path, e))?;
    }
    Step::Remove { path } => {
      host.remove_path(path).map_err(|e| StepError::io("remove", path, e))?;
    }
    Step::AddPath { dir } => add_path(ctx, env, dir)?,
    Step::AddFirstChildToPath { dir } => {
      let child = host
        .first_child(dir)
        .map_err(|e| StepError::io("read directory", dir, e))?
        .ok_or_else(|| StepError::EmptyDirectory(dir.clone()))?;
      add_path(ctx, env, &child)?;
    }
    Step::PrependEnv { name, value } => {
      env.prepend_var(name, value);
      debug!(name, value = ?env.var(name), "updated variable");
    }
    Step::LogPath => {
      let path = env.path_value()?.or_else(|| std::env::var_os("PATH")).unwrap_or_default();
      info!("path is {}", path.to_string_lossy());
    }
  }
  Ok(())
}

fn add_path(ctx: &RunnerContext, env: &mut CommandEnv, dir: &Path) -> Result<(), StepError> {
  env.add_path(dir);
  ctx.add_path(dir)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{HostCall, RecordingHost};

  fn request(target: &str, variant: &str) -> BuildRequest {
    BuildRequest::parse(target, variant, false).unwrap()
  }

  #[tokio::test]
  async fn probe_reads_lsb_release_on_linux() {
    let host = RecordingHost::new(Os::Linux).with_capture("lsb_release -r -s", "16.04");
    let linux = probe_linux(&host, &CommandEnv::new()).await;
    assert!(linux.is_ubuntu_1604());
  }

  #[tokio::test]
  async fn probe_failure_is_not_ubuntu_1604() {
    let host = RecordingHost::new(Os::Linux);
    let linux = probe_linux(&host, &CommandEnv::new()).await;
    assert_eq!(linux, LinuxHost::default());
  }

  #[tokio::test]
  async fn probe_skipped_off_linux() {
    let host = RecordingHost::new(Os::Mac);
    probe_linux(&host, &CommandEnv::new()).await;
    assert!(host.calls().is_empty());
  }

  #[tokio::test]
  async fn mac_install_runs_brew_and_extends_path() {
    let temp = tempfile::TempDir::new().unwrap();
    let path_file = temp.path().join("github_path");
    let mut ctx = RunnerContext::new(temp.path(), temp.path());
    ctx.path_file = Some(path_file.clone());
    let host = RecordingHost::new(Os::Mac);
    let mut env = CommandEnv::new();

    install(&host, &ctx, &request("jdk11", "openj9"), &mut env).await.unwrap();

    assert!(host.ran("brew install autoconf ccache coreutils gnu-tar"));
    assert!(host.ran("brew install bash nasm"));
    assert_eq!(env.paths(), &[PathBuf::from("/usr/local/opt/gnu-tar/libexec/gnubin")]);
    let written = std::fs::read_to_string(path_file).unwrap();
    assert_eq!(written.trim(), "/usr/local/opt/gnu-tar/libexec/gnubin");
  }

  #[tokio::test]
  async fn later_commands_see_earlier_path_additions() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Mac);
    let mut env = CommandEnv::new();

    install(&host, &ctx, &request("jdk11", "openj9"), &mut env).await.unwrap();

    let last = host.calls().into_iter().rev().find_map(|call| match call {
      HostCall::Run { env, .. } => Some(env),
      _ => None,
    });
    assert_eq!(
      last.unwrap().paths(),
      &[PathBuf::from("/usr/local/opt/gnu-tar/libexec/gnubin")]
    );
  }

  #[tokio::test]
  async fn failing_step_stops_installation() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Linux).failing_on("apt-get install");
    let mut env = CommandEnv::new();

    let err = install(&host, &ctx, &request("jdk17u", "hotspot"), &mut env).await.unwrap_err();

    assert!(matches!(err, StepError::Exec(_)));
    assert!(!host.ran("gcc730"));
    assert!(!host.ran("ln -s"));
  }

  #[tokio::test]
  async fn first_child_of_empty_dir_is_an_error() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Windows);
    let mut env = CommandEnv::new();
    let step = Step::AddFirstChildToPath {
      dir: PathBuf::from("C:\\nasm"),
    };

    let err = execute_step(&host, &ctx, &mut env, &step).await.unwrap_err();
    assert!(matches!(err, StepError::EmptyDirectory(_)));

    let host = RecordingHost::new(Os::Windows).with_child("C:\\nasm", "C:\\nasm\\nasm-2.13.03");
    execute_step(&host, &ctx, &mut env, &step).await.unwrap();
    assert_eq!(env.paths(), &[PathBuf::from("C:\\nasm\\nasm-2.13.03")]);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn prepend_env_keeps_run_overrides() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Linux);
    let mut env = CommandEnv::new();
    env.set_var("LIBRARY_PATH", "/opt/lib");
    let step = Step::PrependEnv {
      name: "LIBRARY_PATH".to_string(),
      value: "/usr/lib/x86_64-linux-gnu".to_string(),
    };

    execute_step(&host, &ctx, &mut env, &step).await.unwrap();

    assert_eq!(env.var("LIBRARY_PATH").as_deref(), Some("/usr/lib/x86_64-linux-gnu:/opt/lib"));
  }

  #[test]
  fn steps_serialize_with_kind_tag() {
    let step = Step::download("https://cygwin.com/setup-x86_64.exe", Path::new("C:\\temp\\cygwin.exe"));
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["kind"], "download");
    assert_eq!(json["url"], "https://cygwin.com/setup-x86_64.exe");
  }
}
