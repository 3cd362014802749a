//! Implementation of the `build-jdk build` command.

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;

use buildjdk_lib::context::RunnerContext;
use buildjdk_lib::host::{Host, SystemHost};
use buildjdk_lib::{BuildRequest, build_jdk};

use crate::output::{format_duration, print_stat, print_success};

pub async fn cmd_build(request: &BuildRequest) -> Result<()> {
  let start = Instant::now();
  let host = SystemHost::new();
  let ctx = RunnerContext::from_env(host.os()).context("Failed to read runner context")?;

  let outcome = build_jdk(&host, &ctx, request, Utc::now().date_naive()).await?;

  print_success(&format!(
    "Built {} ({}) in {}",
    request.target,
    request.variant,
    format_duration(start.elapsed())
  ));
  print_stat("Archive", &outcome.archive.display().to_string());
  print_stat("JDK", &outcome.jdk_dir.display().to_string());
  Ok(())
}
