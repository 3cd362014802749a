/// Architecture tag used in archive names and download URLs. Only x64 is built.
pub const ARCH_TAG: &str = "x64";

/// Boot JDK used for the rolling `jdk` target. Bump when a new GA release ships.
pub const LATEST_BOOT_JDK: u32 = 16;

/// First JDK release whose configure script rejects `--enable-dtrace=auto`.
pub const DTRACE_FORCED_SINCE: u32 = 15;

/// First JDK release that writes `<platform>-x86_64-server-release` build directories.
pub const SERVER_RELEASE_LAYOUT_SINCE: u32 = 13;

/// Fixed extraction directory for a downloaded boot JDK on Windows.
pub const WINDOWS_BOOT_DIR: &str = "c:/jdkboot";

pub const BUILD_TOOL_URL: &str = "https://github.com/adoptium/temurin-build.git";
pub const BUILD_TOOL_DIR: &str = "temurin-build";
pub const BUILD_TOOL_SCRIPT: &str = "./makejdk-any-platform.sh";
pub const BUILD_TOOL_CLONE_DEPTH: u32 = 1;

/// Name of the run output holding the compiled JDK directory.
pub const OUTPUT_BUILD_JDK_DIR: &str = "BuildJDKDir";
