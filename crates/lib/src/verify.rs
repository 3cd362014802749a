//! Post-build verification and output publishing.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::{OUTPUT_BUILD_JDK_DIR, SERVER_RELEASE_LAYOUT_SINCE};
use crate::context::RunnerContext;
use crate::error::{BuildError, StepError};
use crate::exec::{self, CommandEnv, CommandSpec};
use crate::host::Host;
use crate::platform::Os;
use crate::request::JdkTarget;

/// Release directory suffix. JDK 13 renamed `normal-server` to `server`.
pub fn release_kind(target: &JdkTarget) -> &'static str {
  match target.version() {
    Some(version) if version < SERVER_RELEASE_LAYOUT_SINCE => "normal-server",
    _ => "server",
  }
}

/// Directory holding the compiled JDK inside the build tool checkout.
pub fn jdk_image_dir(build_dir: &Path, os: Os, target: &JdkTarget) -> PathBuf {
  build_dir
    .join("workspace")
    .join("build")
    .join("src")
    .join("build")
    .join(format!("{}-x86_64-{}-release", os.build_platform(), release_kind(target)))
    .join("jdk")
}

/// Run `java -version` from the compiled JDK and publish its directory.
pub async fn verify_and_publish<H: Host>(
  host: &H,
  ctx: &RunnerContext,
  build_dir: &Path,
  target: &JdkTarget,
  env: &CommandEnv,
) -> Result<PathBuf, BuildError> {
  let os = host.os();
  let jdk_dir = jdk_image_dir(build_dir, os, target);
  let bin = jdk_dir.join("bin");
  let java = exec::executable(&bin, "java", os.exe_suffix());

  if !host.exists(&java) {
    return Err(BuildError::JavaMissing(java));
  }

  let cmd = CommandSpec::new(java.display().to_string()).arg("-version").current_dir(&bin);
  host
    .run(&cmd, env)
    .await
    .map_err(|e| BuildError::Verify(e.into()))?;

  ctx
    .set_output(OUTPUT_BUILD_JDK_DIR, &jdk_dir.display().to_string())
    .map_err(|e| BuildError::Verify(StepError::from(e)))?;
  info!(jdk = %jdk_dir.display(), "published compiled JDK");
  Ok(jdk_dir)
}
