//! Implementation of the `build-jdk plan` command.
//!
//! Resolves everything a build would use and prints it. Nothing is installed,
//! downloaded or cloned.

use anyhow::{Context, Result};
use chrono::Utc;

use buildjdk_lib::bootjdk::BootJdkSource;
use buildjdk_lib::context::RunnerContext;
use buildjdk_lib::deps::Step;
use buildjdk_lib::host::{Host, SystemHost};
use buildjdk_lib::invoke::Checkout;
use buildjdk_lib::{BuildRequest, plan_run};

use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub async fn cmd_plan(request: &BuildRequest, output: OutputFormat) -> Result<()> {
  let host = SystemHost::new();
  let ctx = RunnerContext::from_env(host.os()).context("Failed to read runner context")?;
  let plan = plan_run(&host, &ctx, request, Utc::now().date_naive()).await;

  if output.is_json() {
    return print_json(&plan);
  }

  let config = &plan.config;
  print_info(&format!("Plan for {} ({}) on {}", request.target, request.variant, config.os));
  print_stat("Boot JDK", &config.boot_jdk_version.to_string());
  match &config.boot_jdk {
    BootJdkSource::Preinstalled { path } => print_stat("Boot JDK path", &format!("{} (pre-installed)", path.display())),
    BootJdkSource::Download { plan, path } => {
      print_stat("Boot JDK path", &path.display().to_string());
      print_stat("Boot JDK download", &plan.url);
    }
  }
  print_stat("Archive", &config.settings.archive_name);
  print_stat("Configure args", &config.settings.configure_args);
  match &plan.checkout {
    Checkout::Clone { url, depth, .. } => print_stat("Build tool", &format!("{url} (depth {depth})")),
    Checkout::Existing { dest } => print_stat("Build tool", &format!("{} (pinned)", dest.display())),
  }
  print_stat("Command", &plan.command.display());

  println!();
  print_info(&format!("Dependency steps: {}", plan.dependencies.len()));
  for step in &plan.dependencies {
    println!("  {}", describe(step));
  }
  Ok(())
}

fn describe(step: &Step) -> String {
  match step {
    Step::Run { command, cwd: Some(cwd) } => format!("run {command} (in {})", cwd.display()),
    Step::Run { command, cwd: None } => format!("run {command}"),
    Step::Download { url, dest } => format!("download {url} -> {}", dest.display()),
    Step::ExtractZip { archive, dest } | Step::ExtractTarGz { archive, dest } => {
      format!("extract {} -> {}", archive.display(), dest.display())
    }
    Step::CreateDir { path } => format!("mkdir {}", path.display()),
    Step::Remove { path } => format!("remove {}", path.display()),
    Step::AddPath { dir } => format!("add {} to PATH", dir.display()),
    Step::AddFirstChildToPath { dir } => format!("add first entry of {} to PATH", dir.display()),
    Step::PrependEnv { name, value } => format!("prepend {value} to {name}"),
    Step::LogPath => "log PATH".to_string(),
  }
}
