//! Where a boot JDK comes from: a pre-installed runner JDK or a download.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::ArchiveFormat;
use crate::consts::{ARCH_TAG, WINDOWS_BOOT_DIR};
use crate::context::RunnerContext;
use crate::platform::Os;
use crate::request::Variant;

const LEGACY_BOOTSTRAP_URL: &str = "https://api.adoptopenjdk.net/v2/binary/releases/openjdk8?os=mac&release=latest&arch=x64&heap_size=normal&type=jdk&openjdk_impl=hotspot";

const OPENJ9_BOOT10_MAC_URL: &str = "https://github.com/AdoptOpenJDK/openjdk10-binaries/releases/download/jdk-10.0.2%2B13.1/OpenJDK10U-jdk_x64_mac_hotspot_10.0.2_13.tar.gz";

/// Cases where the generic download rule does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialCase {
  /// Boot JDK 8 or older: a macOS JDK 8 is unpacked into the home staging
  /// directory, whatever the host.
  LegacyBootstrap,
  /// The binary API has no openj9 10 build for macOS; a hotspot 10 release asset is used.
  Openj9Boot10Mac,
  /// openj9 10 archives for Linux nest the JDK one level deeper.
  Openj9Boot10LinuxStrip,
}

/// A boot JDK download, fully resolved before anything is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadPlan {
  pub url: String,
  /// Temporary location of the archive; removed after extraction.
  pub archive: PathBuf,
  pub format: ArchiveFormat,
  /// Leading path components dropped while extracting.
  pub strip: usize,
  pub dest: PathBuf,
  pub special_case: Option<SpecialCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BootJdkSource {
  Preinstalled { path: PathBuf },
  Download { plan: DownloadPlan, path: PathBuf },
}

impl BootJdkSource {
  /// Directory handed to the build tool as the boot JDK.
  pub fn path(&self) -> &Path {
    match self {
      Self::Preinstalled { path } | Self::Download { path, .. } => path,
    }
  }
}

/// Runner variable naming a pre-installed JDK of the given release.
pub fn preinstalled_var(boot_jdk_version: u32) -> String {
  format!("JAVA_HOME_{boot_jdk_version}_{}", ARCH_TAG.to_uppercase())
}

/// Rewrite a Windows path so the build tool's Cygwin shell accepts it.
///
/// Whitespace is removed, backslashes become forward slashes and
/// `ProgramFiles` is replaced by its short name.
pub fn normalize_windows_path(path: &str) -> String {
  path
    .chars()
    .filter(|c| !c.is_whitespace())
    .map(|c| if c == '\\' { '/' } else { c })
    .collect::<String>()
    .replace("ProgramFiles", "Progra~1")
}

/// Path returned for a downloaded boot JDK.
pub fn download_target(os: Os, ctx: &RunnerContext) -> PathBuf {
  match os {
    Os::Windows => PathBuf::from(WINDOWS_BOOT_DIR),
    Os::Linux | Os::Mac => ctx.boot_dir(),
  }
}

/// Work out which archive to fetch and how to unpack it.
pub fn download_plan(os: Os, variant: Variant, boot_jdk_version: u32, ctx: &RunnerContext) -> DownloadPlan {
  if boot_jdk_version <= 8 {
    return DownloadPlan {
      url: LEGACY_BOOTSTRAP_URL.to_string(),
      archive: ctx.temp_dir.join("bootjdk-8.tar.gz"),
      format: ArchiveFormat::TarGz,
      strip: 3,
      dest: ctx.home_dir(),
      special_case: Some(SpecialCase::LegacyBootstrap),
    };
  }

  let openj9_boot10 = variant == Variant::Openj9 && boot_jdk_version == 10;
  let archive = ctx
    .temp_dir
    .join(format!("bootjdk-{boot_jdk_version}.{}", os.archive_extension()));

  match os {
    Os::Mac if openj9_boot10 => DownloadPlan {
      url: OPENJ9_BOOT10_MAC_URL.to_string(),
      archive,
      format: ArchiveFormat::TarGz,
      strip: 3,
      dest: ctx.boot_dir(),
      special_case: Some(SpecialCase::Openj9Boot10Mac),
    },
    Os::Mac => DownloadPlan {
      url: api_url(os, variant, boot_jdk_version),
      archive,
      format: ArchiveFormat::TarGz,
      strip: 3,
      dest: ctx.boot_dir(),
      special_case: None,
    },
    Os::Linux => DownloadPlan {
      url: api_url(os, variant, boot_jdk_version),
      archive,
      format: ArchiveFormat::TarGz,
      strip: if openj9_boot10 { 2 } else { 1 },
      dest: ctx.boot_dir(),
      special_case: openj9_boot10.then_some(SpecialCase::Openj9Boot10LinuxStrip),
    },
    Os::Windows => DownloadPlan {
      url: api_url(os, variant, boot_jdk_version),
      archive,
      format: ArchiveFormat::Zip,
      strip: 1,
      dest: PathBuf::from(WINDOWS_BOOT_DIR),
      special_case: None,
    },
  }
}

fn api_url(os: Os, variant: Variant, boot_jdk_version: u32) -> String {
  format!(
    "https://api.adoptopenjdk.net/v3/binary/latest/{boot_jdk_version}/ga/{os}/{ARCH_TAG}/jdk/{variant}/normal/adoptopenjdk"
  )
}
