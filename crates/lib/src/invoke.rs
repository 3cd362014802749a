//! Invocation of the external build tool.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::consts::{ARCH_TAG, BUILD_TOOL_CLONE_DEPTH, BUILD_TOOL_SCRIPT, BUILD_TOOL_URL};
use crate::context::RunnerContext;
use crate::error::{BuildError, StepError};
use crate::exec::{CommandEnv, CommandSpec};
use crate::host::Host;
use crate::pipeline::ResolvedConfig;

/// How the build tool checkout is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Checkout {
  Clone { url: String, dest: PathBuf, depth: u32 },
  /// A checkout placed by an earlier job step, e.g. a pull request ref.
  Existing { dest: PathBuf },
}

impl Checkout {
  pub fn for_run(ctx: &RunnerContext, use_pinned_ref: bool) -> Self {
    let dest = ctx.build_tool_dir();
    if use_pinned_ref {
      Self::Existing { dest }
    } else {
      Self::Clone {
        url: BUILD_TOOL_URL.to_string(),
        dest,
        depth: BUILD_TOOL_CLONE_DEPTH,
      }
    }
  }

  pub fn dest(&self) -> &Path {
    match self {
      Self::Clone { dest, .. } | Self::Existing { dest } => dest,
    }
  }
}

/// Clone the build tool, or check the pinned checkout is in place.
pub fn fetch_build_tool<H: Host>(host: &H, checkout: &Checkout) -> Result<PathBuf, BuildError> {
  match checkout {
    Checkout::Clone { url, dest, depth } => host
      .clone_repo(url, dest, *depth)
      .map_err(|e| BuildError::Build(StepError::from(e))),
    Checkout::Existing { dest } if host.exists(dest) => {
      debug!(dest = %dest.display(), "using existing build tool checkout");
      Ok(dest.clone())
    }
    Checkout::Existing { dest } => Err(BuildError::BuildToolMissing(dest.clone())),
  }
}

/// Command line for the build tool, run from inside its checkout.
pub fn build_command(config: &ResolvedConfig, build_dir: &Path) -> CommandSpec {
  let mut cmd = CommandSpec::new("bash")
    .arg(BUILD_TOOL_SCRIPT)
    .arg("-J")
    .arg(config.boot_jdk.path().display().to_string());
  if let Some(flag) = config.settings.feature_flag {
    cmd = cmd.arg(flag);
  }
  cmd
    .arg("--configure-args")
    .arg(config.settings.configure_args.as_str())
    .args(["-d", "artifacts"])
    .arg("--target-file-name")
    .arg(config.settings.archive_name.as_str())
    .arg("--use-jep319-certs")
    .arg("--build-variant")
    .arg(config.request.variant.as_str())
    .arg("--disable-adopt-branch-safety")
    .arg(config.request.target.to_string())
    .current_dir(build_dir)
}

/// Run the build tool in `build_dir`.
pub async fn invoke<H: Host>(
  host: &H,
  ctx: &RunnerContext,
  config: &ResolvedConfig,
  build_dir: &Path,
  env: &mut CommandEnv,
) -> Result<(), BuildError> {
  // The build tool reads ARCHITECTURE and misdetects it when unset.
  env.set_var("ARCHITECTURE", ARCH_TAG);
  ctx
    .export_variable("ARCHITECTURE", ARCH_TAG)
    .map_err(|e| BuildError::Build(e.into()))?;

  let cmd = build_command(config, build_dir);
  info!(jdk = %config.request.target, variant = %config.request.variant, "invoking build tool");
  host
    .run(&cmd, env)
    .await
    .map_err(|e| BuildError::Build(e.into()))
}

/// Find the archive the build tool produced anywhere under the workspace.
pub fn locate_archive<H: Host>(host: &H, ctx: &RunnerContext, name: &str) -> Result<PathBuf, BuildError> {
  let found = host.find_file(&ctx.workspace, name).ok_or_else(|| BuildError::ArchiveNotFound {
    name: name.to_string(),
    root: ctx.workspace.clone(),
  })?;
  info!(archive = %found.display(), "found build archive");
  Ok(found)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bootjdk::BootJdkSource;
  use crate::configure;
  use crate::platform::Os;
  use crate::request::BuildRequest;
  use crate::util::testutil::{HostCall, RecordingHost};
  use chrono::NaiveDate;

  fn config(os: Os, target: &str, variant: &str) -> ResolvedConfig {
    let request = BuildRequest::parse(target, variant, false).unwrap();
    let date = NaiveDate::from_ymd_opt(2021, 5, 14).unwrap();
    ResolvedConfig {
      os,
      boot_jdk_version: 16,
      boot_jdk: BootJdkSource::Preinstalled {
        path: PathBuf::from("/opt/jdk16"),
      },
      settings: configure::assemble(&request, os, 16, date),
      request,
    }
  }

  #[test]
  fn linux_command_includes_feature_flag() {
    let cmd = build_command(&config(Os::Linux, "jdk17u", "hotspot"), Path::new("/ws/temurin-build"));

    assert_eq!(cmd.program, "bash");
    assert_eq!(
      cmd.args,
      vec![
        "./makejdk-any-platform.sh",
        "-J",
        "/opt/jdk16",
        "--skip-freetype",
        "--configure-args",
        "--disable-ccache --disable-warnings-as-errors --enable-dtrace",
        "-d",
        "artifacts",
        "--target-file-name",
        "OpenJDK17U-jdk_x64_linux_hotspot_2021-05-14.tar.gz",
        "--use-jep319-certs",
        "--build-variant",
        "hotspot",
        "--disable-adopt-branch-safety",
        "jdk17u",
      ]
    );
    assert_eq!(cmd.cwd, Some(PathBuf::from("/ws/temurin-build")));
  }

  #[test]
  fn feature_flag_is_omitted_when_empty() {
    let cmd = build_command(&config(Os::Mac, "jdk11", "openj9"), Path::new("/ws/temurin-build"));
    assert_eq!(cmd.args[3], "--configure-args");
    assert!(!cmd.args.iter().any(|arg| arg.is_empty()));
  }

  #[test]
  fn pinned_ref_never_clones() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let checkout = Checkout::for_run(&ctx, true);
    let host = RecordingHost::new(Os::Linux).with_existing("/ws/temurin-build");

    let dir = fetch_build_tool(&host, &checkout).unwrap();

    assert_eq!(dir, PathBuf::from("/ws/temurin-build"));
    assert!(!host.calls().iter().any(|call| matches!(call, HostCall::Clone { .. })));
  }

  #[test]
  fn pinned_ref_without_checkout_fails() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Linux);

    let err = fetch_build_tool(&host, &Checkout::for_run(&ctx, true)).unwrap_err();

    assert!(matches!(err, BuildError::BuildToolMissing(_)));
    assert!(err.to_string().starts_with("build failed and"));
  }

  #[test]
  fn default_checkout_is_shallow_clone() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Linux);

    fetch_build_tool(&host, &Checkout::for_run(&ctx, false)).unwrap();

    assert_eq!(
      host.calls(),
      vec![HostCall::Clone {
        url: "https://github.com/adoptium/temurin-build.git".to_string(),
        dest: PathBuf::from("/ws/temurin-build"),
        depth: 1,
      }]
    );
  }

  #[tokio::test]
  async fn invoke_exports_architecture() {
    let temp = tempfile::TempDir::new().unwrap();
    let env_file = temp.path().join("github_env");
    let mut ctx = RunnerContext::new("/ws", "/tmp");
    ctx.env_file = Some(env_file.clone());
    let host = RecordingHost::new(Os::Linux);
    let mut env = CommandEnv::new();

    invoke(&host, &ctx, &config(Os::Linux, "jdk", "hotspot"), Path::new("/ws/temurin-build"), &mut env)
      .await
      .unwrap();

    match &host.calls()[0] {
      HostCall::Run { env, cwd, .. } => {
        assert_eq!(env.vars().get("ARCHITECTURE").map(String::as_str), Some("x64"));
        assert_eq!(cwd.as_deref(), Some(Path::new("/ws/temurin-build")));
      }
      other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(env_file).unwrap(), "ARCHITECTURE=x64\n");
  }

  #[tokio::test]
  async fn tool_failure_is_a_build_error() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let host = RecordingHost::new(Os::Linux).failing_on("makejdk-any-platform.sh");
    let mut env = CommandEnv::new();

    let err = invoke(&host, &ctx, &config(Os::Linux, "jdk", "hotspot"), Path::new("/ws/temurin-build"), &mut env)
      .await
      .unwrap_err();

    assert!(matches!(err, BuildError::Build(_)));
  }

  #[test]
  fn archive_is_found_anywhere_under_workspace() {
    let ctx = RunnerContext::new("/ws", "/tmp");
    let archive = "/ws/temurin-build/workspace/target/OpenJDK-jdk_x64_linux_hotspot_2021-05-14.tar.gz";
    let host = RecordingHost::new(Os::Linux).with_existing(archive);

    let found = locate_archive(&host, &ctx, "OpenJDK-jdk_x64_linux_hotspot_2021-05-14.tar.gz").unwrap();
    assert_eq!(found, PathBuf::from(archive));

    let err = locate_archive(&host, &ctx, "OpenJDK11-jdk_x64_linux_hotspot_2021-05-14.tar.gz").unwrap_err();
    assert!(matches!(err, BuildError::ArchiveNotFound { .. }));
  }
}
