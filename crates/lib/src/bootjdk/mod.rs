//! Boot JDK resolution.
//!
//! A JDK is compiled with the previous feature release. The runner may already
//! carry one (`JAVA_HOME_<N>_X64`); otherwise a GA build is downloaded from the
//! binary API and unpacked into a staging directory.

mod source;
mod version;

use std::path::PathBuf;

use tracing::{debug, info, warn};

pub use source::{BootJdkSource, DownloadPlan, SpecialCase, download_plan, normalize_windows_path, preinstalled_var};
pub use version::boot_jdk_version;

use crate::context::RunnerContext;
use crate::error::StepError;
use crate::host::Host;
use crate::platform::Os;
use crate::request::Variant;

/// Decide where the boot JDK comes from without touching the network.
pub fn locate<H: Host>(host: &H, ctx: &RunnerContext, variant: Variant, boot_jdk_version: u32) -> BootJdkSource {
  let os = host.os();
  let var = preinstalled_var(boot_jdk_version);

  match host.env_var(&var).filter(|value| !value.trim().is_empty()) {
    Some(value) => {
      let path = match os {
        Os::Windows => normalize_windows_path(&value),
        Os::Linux | Os::Mac => value,
      };
      debug!(var = %var, path = %path, "using pre-installed boot JDK");
      BootJdkSource::Preinstalled { path: PathBuf::from(path) }
    }
    None => BootJdkSource::Download {
      plan: download_plan(os, variant, boot_jdk_version, ctx),
      path: source::download_target(os, ctx),
    },
  }
}

/// Make the boot JDK available on disk and return its directory.
pub async fn acquire<H: Host>(host: &H, source: &BootJdkSource) -> Result<PathBuf, StepError> {
  let plan = match source {
    BootJdkSource::Preinstalled { path } => return Ok(path.clone()),
    BootJdkSource::Download { plan, .. } => plan,
  };

  if plan.special_case == Some(SpecialCase::LegacyBootstrap) && host.os() != Os::Mac {
    warn!(
      os = %host.os(),
      "boot JDK 8 bootstrap only ships a macOS build; it is unpacked but the build may not use it"
    );
  }

  info!(url = %plan.url, dest = %plan.dest.display(), strip = plan.strip, "downloading boot JDK");
  host
    .create_dir_all(&plan.dest)
    .map_err(|e| StepError::io("create directory", &plan.dest, e))?;
  let archive = host.download(&plan.url, &plan.archive).await?;
  let entries = host.extract(&archive, plan.format, &plan.dest, plan.strip)?;
  debug!(entries, "boot JDK extracted");
  host
    .remove_path(&archive)
    .map_err(|e| StepError::io("remove", &archive, e))?;

  Ok(source.path().to_path_buf())
}
