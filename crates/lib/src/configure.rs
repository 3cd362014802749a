//! Build configuration derivation: archive name, configure flags and feature flag.
//!
//! Everything here is a pure function of the request, the target OS, the boot
//! JDK version and the build date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::consts::{ARCH_TAG, DTRACE_FORCED_SINCE};
use crate::platform::Os;
use crate::request::{BuildRequest, JdkTarget, Variant};

const WINDOWS_OPENJ9_ARGS: &str = "--with-freemarker-jar='c:/freemarker.jar' \
  --with-openssl='c:/OpenSSL-1.1.1g-x86_64-VS2017' --enable-openssl-bundling --enable-cuda \
  -with-cuda='C:/Program Files/NVIDIA GPU Computing Toolkit/CUDA/v9.0'";

/// Strings handed to the external build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSettings {
  pub archive_name: String,
  pub configure_args: String,
  /// Extra flag for the build tool itself, if any.
  pub feature_flag: Option<&'static str>,
}

pub fn assemble(request: &BuildRequest, os: Os, boot_jdk_version: u32, date: NaiveDate) -> BuildSettings {
  BuildSettings {
    archive_name: archive_name(&request.target, request.variant, os, date),
    configure_args: configure_args(os, request.variant, boot_jdk_version),
    feature_flag: feature_flag(os),
  }
}

/// `Open<TARGET>-jdk_x64_<os>_<variant>_<YYYY-MM-DD>.<ext>`
pub fn archive_name(target: &JdkTarget, variant: Variant, os: Os, date: NaiveDate) -> String {
  format!(
    "Open{}-jdk_{ARCH_TAG}_{os}_{variant}_{}.{}",
    target.to_string().to_uppercase(),
    date.format("%Y-%m-%d"),
    os.archive_extension()
  )
}

/// Configure arguments for an OS and variant.
///
/// Linux additionally gets a dtrace flag that depends on the release being built.
pub fn configure_args(os: Os, variant: Variant, boot_jdk_version: u32) -> String {
  let base = match (os, variant) {
    (Os::Mac, _) => "--disable-warnings-as-errors --with-extra-cxxflags='-stdlib=libc++ -mmacosx-version-min=10.8'",
    (Os::Linux, Variant::Hotspot) | (Os::Windows, Variant::Hotspot) => "--disable-ccache --disable-warnings-as-errors",
    (Os::Linux, Variant::Openj9) => {
      "--disable-ccache --enable-jitserver --disable-warnings-as-errors \
       --with-openssl=/usr/local/openssl-1.0.2 --enable-cuda --with-cuda=/usr/local/cuda-9.0"
    }
    (Os::Windows, Variant::Openj9) => WINDOWS_OPENJ9_ARGS,
  };

  match os {
    Os::Linux => format!("{base} {}", dtrace_flag(boot_jdk_version)),
    Os::Mac | Os::Windows => base.to_string(),
  }
}

/// `auto` stopped being a valid `--enable-dtrace` value in JDK 15.
pub fn dtrace_flag(boot_jdk_version: u32) -> &'static str {
  if boot_jdk_version + 1 >= DTRACE_FORCED_SINCE {
    "--enable-dtrace"
  } else {
    "--enable-dtrace=auto"
  }
}

/// Linux builds use the system freetype instead of a bundled copy.
pub fn feature_flag(os: Os) -> Option<&'static str> {
  match os {
    Os::Linux => Some("--skip-freetype"),
    Os::Mac | Os::Windows => None,
  }
}
