//! A complete run for one [`BuildRequest`].

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::bootjdk::{self, BootJdkSource};
use crate::configure::{self, BuildSettings};
use crate::context::RunnerContext;
use crate::deps::{self, Step};
use crate::error::{BuildError, StepError};
use crate::exec::{CommandEnv, CommandSpec};
use crate::host::Host;
use crate::invoke::{self, Checkout};
use crate::platform::Os;
use crate::request::BuildRequest;
use crate::verify;

/// Everything derived for a run before the build tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
  pub os: Os,
  pub request: BuildRequest,
  pub boot_jdk_version: u32,
  pub boot_jdk: BootJdkSource,
  pub settings: BuildSettings,
}

impl ResolvedConfig {
  pub fn resolve<H: Host>(host: &H, ctx: &RunnerContext, request: &BuildRequest, date: NaiveDate) -> Self {
    let os = host.os();
    let boot_jdk_version = bootjdk::boot_jdk_version(&request.target);
    Self {
      os,
      request: request.clone(),
      boot_jdk_version,
      boot_jdk: bootjdk::locate(host, ctx, request.variant, boot_jdk_version),
      settings: configure::assemble(request, os, boot_jdk_version, date),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
  pub config: ResolvedConfig,
  /// Archive produced by the build tool.
  pub archive: PathBuf,
  /// Compiled JDK directory, also published as the `BuildJDKDir` output.
  pub jdk_dir: PathBuf,
}

/// What a run would do, without doing it.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
  pub config: ResolvedConfig,
  pub dependencies: Vec<Step>,
  pub checkout: Checkout,
  pub command: CommandSpec,
}

/// Derive the full plan for a run. Only reads from the host.
pub async fn plan_run<H: Host>(host: &H, ctx: &RunnerContext, request: &BuildRequest, date: NaiveDate) -> RunPlan {
  let linux_host = deps::probe_linux(host, &CommandEnv::new()).await;
  let config = ResolvedConfig::resolve(host, ctx, request, date);
  let checkout = Checkout::for_run(ctx, request.use_pinned_ref);
  let command = invoke::build_command(&config, checkout.dest());

  RunPlan {
    dependencies: deps::plan(config.os, request.variant, &request.target, &linux_host, &ctx.temp_dir),
    checkout,
    command,
    config,
  }
}

/// Build a JDK end to end and publish the compiled JDK directory.
pub async fn build_jdk<H: Host>(
  host: &H,
  ctx: &RunnerContext,
  request: &BuildRequest,
  date: NaiveDate,
) -> Result<BuildOutcome, BuildError> {
  info!(jdk = %request.target, variant = %request.variant, os = %host.os(), "starting build");

  for dir in [ctx.boot_dir(), ctx.home_dir()] {
    host
      .create_dir_all(&dir)
      .map_err(|e| BuildError::Stage(StepError::io("create directory", &dir, e)))?;
  }

  let mut env = CommandEnv::new();
  deps::install(host, ctx, request, &mut env)
    .await
    .map_err(BuildError::Dependency)?;

  let config = ResolvedConfig::resolve(host, ctx, request, date);
  bootjdk::acquire(host, &config.boot_jdk)
    .await
    .map_err(BuildError::BootJdk)?;
  info!(
    boot_jdk_version = config.boot_jdk_version,
    boot_jdk = %config.boot_jdk.path().display(),
    archive = %config.settings.archive_name,
    "resolved build configuration"
  );

  let checkout = Checkout::for_run(ctx, request.use_pinned_ref);
  let build_dir = invoke::fetch_build_tool(host, &checkout)?;
  invoke::invoke(host, ctx, &config, &build_dir, &mut env).await?;
  let archive = invoke::locate_archive(host, ctx, &config.settings.archive_name)?;
  let jdk_dir = verify::verify_and_publish(host, ctx, &build_dir, &request.target, &env).await?;

  Ok(BuildOutcome {
    config,
    archive,
    jdk_dir,
  })
}
