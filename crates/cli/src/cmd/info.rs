use anyhow::Result;

use buildjdk_lib::BuildRequest;
use buildjdk_lib::bootjdk::{boot_jdk_version, preinstalled_var};
use buildjdk_lib::host::{Host, SystemHost};

use crate::output::{print_info, print_stat, print_warning};

pub fn cmd_info(request: &BuildRequest) -> Result<()> {
  let host = SystemHost::new();
  let os = host.os();
  let boot = boot_jdk_version(&request.target);
  let var = preinstalled_var(boot);

  print_info("System:");
  print_stat("Platform", os.as_str());
  print_stat("Build platform", os.build_platform());
  print_stat("Archive format", os.archive_extension());
  print_stat("Boot JDK", &format!("{boot} (for {})", request.target));

  match host.env_var(&var).filter(|path| !path.trim().is_empty()) {
    Some(path) => print_stat(&var, &path),
    None => print_warning(&format!("{var} is not set; the boot JDK will be downloaded")),
  }
  Ok(())
}
