use crate::consts::LATEST_BOOT_JDK;
use crate::request::JdkTarget;

/// JDK release needed to compile `target`: one below the target release, or a
/// fixed release for the rolling head.
pub fn boot_jdk_version(target: &JdkTarget) -> u32 {
  match target {
    JdkTarget::Latest => LATEST_BOOT_JDK,
    JdkTarget::Release { version, .. } => version.saturating_sub(1),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn boot(id: &str) -> String {
    boot_jdk_version(&id.parse().unwrap()).to_string()
  }

  #[test]
  fn update_marker_is_stripped() {
    assert_eq!(boot("jdk17u"), "16");
    assert_eq!(boot("jdk11u"), "10");
    assert_eq!(boot("jdk8u"), "7");
  }

  #[test]
  fn plain_release_is_one_below() {
    assert_eq!(boot("jdk11"), "10");
    assert_eq!(boot("jdk16"), "15");
  }

  #[test]
  fn rolling_head_uses_fixed_release() {
    assert_eq!(boot("jdk"), LATEST_BOOT_JDK.to_string());
  }
}
