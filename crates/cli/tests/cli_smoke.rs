//! CLI smoke tests for build-jdk.
//!
//! Only commands that never install, download or build are exercised here.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command for the build-jdk binary with runner variables pointed at `temp`.
fn build_jdk_cmd(temp: &TempDir) -> Command {
  let mut cmd = cargo_bin_cmd!("build-jdk");
  cmd
    .env_remove("INPUT_JAVATOBUILD")
    .env_remove("INPUT_IMPL")
    .env_remove("INPUT_USEPRREF")
    .env_remove("GITHUB_OUTPUT")
    .env_remove("GITHUB_ENV")
    .env_remove("GITHUB_PATH")
    .env("GITHUB_WORKSPACE", temp.path())
    .env("RUNNER_TEMP", temp.path().join("tmp"));
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"))
    .stdout(predicate::str::contains("--java-to-build"));
}

#[test]
fn version_flag_works() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("build-jdk"));
}

#[test]
fn subcommand_help_works() {
  let temp = TempDir::new().unwrap();
  for cmd in &["build", "plan", "info"] {
    build_jdk_cmd(&temp)
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Plan
// =============================================================================

#[test]
fn plan_reads_inputs_from_env() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .env("INPUT_JAVATOBUILD", "jdk11")
    .env("INPUT_IMPL", "openj9")
    .args(["plan", "--output", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"OpenJDK11-jdk_x64_"))
    .stdout(predicate::str::contains("\"boot_jdk_version\": 10"))
    .stdout(predicate::str::contains("\"variant\": \"openj9\""));
}

#[test]
fn plan_flags_override_env() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .env("INPUT_JAVATOBUILD", "jdk11")
    .args(["plan", "--java-to-build", "jdk17u", "--output", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"OpenJDK17U-jdk_x64_"))
    .stdout(predicate::str::contains("\"variant\": \"hotspot\""));
}

#[test]
fn pinned_ref_plan_does_not_clone() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .env("INPUT_USEPRREF", "true")
    .args(["plan", "--output", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"kind\": \"existing\""));
}

#[test]
fn pr_ref_requires_exact_true() {
  let temp = TempDir::new().unwrap();
  for value in ["", "True", "1", "false"] {
    build_jdk_cmd(&temp)
      .env("INPUT_USEPRREF", value)
      .args(["plan", "--output", "json"])
      .assert()
      .success()
      .stdout(predicate::str::contains("\"kind\": \"clone\""));
  }
}

#[test]
fn pr_ref_flag_without_value_enables_it() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .args(["--use-pr-ref", "plan", "--output", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"kind\": \"existing\""));
}

#[test]
fn plan_text_output() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .args(["--java-to-build", "jdk16", "plan"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Plan for jdk16 (hotspot)"))
    .stdout(predicate::str::contains("Dependency steps:"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn invalid_impl_fails_with_error_command() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .args(["--impl", "zulu", "plan"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown implementation 'zulu'"))
    .stdout(predicate::str::contains("::error::"));
}

#[test]
fn invalid_target_fails() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .args(["--java-to-build", "openjdk11", "info"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid JDK target 'openjdk11'"));
}

// =============================================================================
// Info
// =============================================================================

#[test]
fn info_shows_boot_jdk_for_target() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .args(["--java-to-build", "jdk17u", "info"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Boot JDK: 16 (for jdk17u)"));
}

#[test]
fn info_treats_empty_boot_jdk_variable_as_unset() {
  let temp = TempDir::new().unwrap();
  build_jdk_cmd(&temp)
    .env("JAVA_HOME_16_X64", "  ")
    .args(["--java-to-build", "jdk17u", "info"])
    .assert()
    .success()
    .stderr(predicate::str::contains("JAVA_HOME_16_X64 is not set"));
}
