use std::fmt;

use serde::Serialize;

/// Operating system tags used in download URLs, archive names and layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Mac,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Self {
    Self::from_target_os(std::env::consts::OS)
  }

  /// Map a `std::env::consts::OS` value to a tag. Unrecognized values fall
  /// through to `Windows`.
  pub fn from_target_os(os: &str) -> Self {
    match os {
      "linux" => Self::Linux,
      "macos" => Self::Mac,
      _ => Self::Windows,
    }
  }

  /// Returns the tag used in archive names and the binary API (`linux`, `mac`, `windows`)
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Mac => "mac",
      Self::Windows => "windows",
    }
  }

  /// Returns the platform name the JDK build system uses for its output directories
  pub const fn build_platform(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Mac => "macosx",
      Self::Windows => "windows",
    }
  }

  /// Extension of the archive produced by the external build tool
  pub const fn archive_extension(&self) -> &'static str {
    match self {
      Self::Linux | Self::Mac => "tar.gz",
      Self::Windows => "zip",
    }
  }

  pub const fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      Self::Linux | Self::Mac => "",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
