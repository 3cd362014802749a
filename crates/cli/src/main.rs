mod cmd;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use buildjdk_lib::BuildRequest;
use buildjdk_lib::context::error_command;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "build-jdk")]
#[command(author, version, about = "Build a JDK from source on a CI runner", long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  inputs: InputArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

/// Action inputs. Each one falls back to the variable the runner sets for it.
#[derive(Args)]
struct InputArgs {
  /// JDK to build: jdk, jdk<N> or jdk<N>u
  #[arg(long, env = "INPUT_JAVATOBUILD", default_value = "jdk", global = true)]
  java_to_build: String,

  /// Implementation variant: hotspot or openj9
  #[arg(long = "impl", env = "INPUT_IMPL", default_value = "hotspot", global = true)]
  variant: String,

  /// Reuse the build tool already checked out in the workspace.
  /// Only the exact value `true` enables it.
  #[arg(
    long,
    env = "INPUT_USEPRREF",
    global = true,
    action = clap::ArgAction::Set,
    num_args = 0..=1,
    require_equals = true,
    default_value = "false",
    default_missing_value = "true",
    value_parser = parse_pr_ref,
  )]
  use_pr_ref: bool,
}

fn parse_pr_ref(value: &str) -> Result<bool, std::convert::Infallible> {
  Ok(value == "true")
}

impl InputArgs {
  fn to_request(&self) -> Result<BuildRequest> {
    BuildRequest::parse(&self.java_to_build, &self.variant, self.use_pr_ref).context("Invalid action inputs")
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Install dependencies, build the JDK and publish its location (default)
  Build,

  /// Show the resolved configuration and steps without running anything
  Plan {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show the detected platform and boot JDK availability
  Info,
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  if let Err(err) = run(cli) {
    let message = format!("{err:#}");
    output::print_error(&message);
    println!("{}", error_command(&message));
    std::process::exit(1);
  }
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let request = cli.inputs.to_request()?;
  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  match cli.command.unwrap_or(Commands::Build) {
    Commands::Build => runtime.block_on(cmd::cmd_build(&request)),
    Commands::Plan { output } => runtime.block_on(cmd::cmd_plan(&request, output)),
    Commands::Info => cmd::cmd_info(&request),
  }
}
