//! The build request: what to build, which variant, and where the build tool comes from.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised while parsing run parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
  #[error("invalid JDK target '{0}': expected 'jdk', 'jdk<N>' or 'jdk<N>u'")]
  InvalidTarget(String),

  #[error("unknown implementation '{0}': expected 'hotspot' or 'openj9'")]
  InvalidVariant(String),
}

/// Version label of the JDK to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JdkTarget {
  /// The rolling `jdk` head repository.
  Latest,
  /// A numbered release, e.g. `jdk11` or `jdk17u` when `update` is set.
  Release { version: u32, update: bool },
}

impl JdkTarget {
  /// Numeric feature release, `None` for the rolling head.
  pub fn version(&self) -> Option<u32> {
    match self {
      Self::Latest => None,
      Self::Release { version, .. } => Some(*version),
    }
  }
}

impl FromStr for JdkTarget {
  type Err = RequestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || RequestError::InvalidTarget(s.to_string());

    let rest = s.strip_prefix("jdk").ok_or_else(invalid)?;
    if rest.is_empty() {
      return Ok(Self::Latest);
    }

    let (digits, update) = match rest.strip_suffix('u') {
      Some(digits) => (digits, true),
      None => (rest, false),
    };
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }

    match digits.parse::<u32>() {
      Ok(version) if version > 0 => Ok(Self::Release { version, update }),
      _ => Err(invalid()),
    }
  }
}

impl fmt::Display for JdkTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Latest => write!(f, "jdk"),
      Self::Release { version, update: true } => write!(f, "jdk{version}u"),
      Self::Release { version, update: false } => write!(f, "jdk{version}"),
    }
  }
}

impl Serialize for JdkTarget {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// JDK runtime technology to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
  Hotspot,
  Openj9,
}

impl Variant {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Hotspot => "hotspot",
      Self::Openj9 => "openj9",
    }
  }
}

impl FromStr for Variant {
  type Err = RequestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "hotspot" => Ok(Self::Hotspot),
      "openj9" => Ok(Self::Openj9),
      other => Err(RequestError::InvalidVariant(other.to_string())),
    }
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Immutable description of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
  pub target: JdkTarget,
  pub variant: Variant,
  /// Reuse an already checked-out build tool instead of cloning it.
  pub use_pinned_ref: bool,
}

impl BuildRequest {
  /// Parse a request from raw action inputs.
  pub fn parse(target: &str, variant: &str, use_pinned_ref: bool) -> Result<Self, RequestError> {
    Ok(Self {
      target: target.trim().parse()?,
      variant: variant.trim().parse()?,
      use_pinned_ref,
    })
  }
}
