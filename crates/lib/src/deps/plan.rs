//! Per-platform dependency plans.

use std::path::{Path, PathBuf};

use super::Step;
use crate::platform::Os;
use crate::request::{JdkTarget, Variant};

const APT_INSTALL: &str = "sudo apt-get install -qq -y --no-install-recommends";

const LINUX_PACKAGES: &[&str] = &[
  "software-properties-common",
  "autoconf",
  "cpio",
  "libasound2-dev",
  "libcups2-dev",
  "libelf-dev",
  "libfontconfig1-dev",
  "libfreetype6-dev",
  "libx11-dev",
  "libxext-dev",
  "libxrender-dev",
  "libxrandr-dev",
  "libxt-dev",
  "libxtst-dev",
  "make",
  "systemtap-sdt-dev",
  "libnuma-dev",
  "gcc-multilib",
  "pkg-config",
];

const CYGWIN_PACKAGES: &str =
  "wget,bsdtar,rsync,gnupg,git,autoconf,make,gcc-core,mingw64-x86_64-gcc-core,unzip,zip,cpio,curl,grep,perl";

const CUDA_LINUX_URL: &str = "https://developer.nvidia.com/compute/cuda/9.0/Prod/local_installers/cuda_9.0.176_384.81_linux-run";
const OPENSSL_LINUX_URL: &str = "https://www.openssl.org/source/old/1.0.2/openssl-1.0.2r.tar.gz";
const GCC_URL: &str = "https://ci.adoptopenjdk.net/userContent/gcc/gcc730+ccache.x86_64.tar.xz";

const FREEMARKER_URL: &str = "https://repo.maven.apache.org/maven2/freemarker/freemarker/2.3.8/freemarker-2.3.8.jar";
const NASM_WINDOWS_URL: &str = "https://www.nasm.us/pub/nasm/releasebuilds/2.13.03/win64/nasm-2.13.03-win64.zip";
const LLVM_WINDOWS_URL: &str = "https://ci.adoptopenjdk.net/userContent/winansible/llvm-7.0.0-win64.zip";
const CUDA_WINDOWS_URL: &str =
  "https://developer.nvidia.com/compute/cuda/9.0/Prod/network_installers/cuda_9.0.176_win10_network-exe";
const OPENSSL_WINDOWS_URL: &str = "https://www.openssl.org/source/openssl-1.1.1g.tar.gz";
const VS2017_BUILD_DIR: &str = "C:\\Program Files (x86)\\Microsoft Visual Studio\\2017\\Enterprise\\VC\\Auxiliary\\Build";

/// What is known about the Linux host before planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinuxHost {
  /// Output of `lsb_release -r -s`, if it could be read.
  pub ubuntu_release: Option<String>,
}

impl LinuxHost {
  pub fn is_ubuntu_1604(&self) -> bool {
    self.ubuntu_release.as_deref() == Some("16.04")
  }
}

/// Ordered installation steps for a platform, variant and target.
pub fn plan(os: Os, variant: Variant, target: &JdkTarget, linux_host: &LinuxHost, temp_dir: &Path) -> Vec<Step> {
  match os {
    Os::Mac => mac(variant),
    Os::Linux => linux(variant, target, linux_host, temp_dir),
    Os::Windows => windows(variant),
  }
}

fn mac(variant: Variant) -> Vec<Step> {
  let mut steps = vec![
    Step::run("brew install autoconf ccache coreutils gnu-tar"),
    Step::AddPath {
      dir: PathBuf::from("/usr/local/opt/gnu-tar/libexec/gnubin"),
    },
    Step::LogPath,
  ];
  if variant == Variant::Openj9 {
    steps.push(Step::run("brew install bash nasm"));
  }
  steps
}

/// Extra packages older Ubuntu images need before the common list.
fn ubuntu_1604_packages() -> Vec<Step> {
  vec![
    Step::run("sudo apt-get update"),
    Step::run(format!("{APT_INSTALL} python-software-properties realpath")),
  ]
}

/// JDK 8 updates build against an OpenJDK 7 from the openjdk-r PPA.
fn jdk8u_legacy_packages() -> Vec<Step> {
  vec![
    Step::run("sudo add-apt-repository ppa:openjdk-r/ppa"),
    Step::run("sudo apt-get update"),
    Step::run(format!("{APT_INSTALL} openjdk-7-jdk")),
  ]
}

fn linux(variant: Variant, target: &JdkTarget, host: &LinuxHost, temp_dir: &Path) -> Vec<Step> {
  let mut steps = Vec::new();

  if host.is_ubuntu_1604() {
    steps.extend(ubuntu_1604_packages());
  }

  steps.push(Step::run("sudo apt-get update"));
  steps.push(Step::run(format!("{APT_INSTALL} {}", LINUX_PACKAGES.join(" "))));

  if *target == (JdkTarget::Release { version: 8, update: true }) {
    steps.extend(jdk8u_legacy_packages());
  }

  if variant == Variant::Openj9 {
    steps.push(Step::run("sudo apt-get update"));
    steps.push(Step::run(format!("{APT_INSTALL} nasm libdwarf-dev ssh")));

    let cuda = temp_dir.join("cuda_9.0.176_384.81_linux-run");
    steps.push(Step::download(CUDA_LINUX_URL, &cuda));
    steps.push(Step::run(format!("sudo sh {} --silent --toolkit --override", cuda.display())));
    steps.push(Step::remove(&cuda));

    let openssl = temp_dir.join("openssl-1.0.2r.tar.gz");
    let openssl_src = temp_dir.join("openssl-1.0.2r");
    steps.push(Step::download(OPENSSL_LINUX_URL, &openssl));
    steps.push(Step::ExtractTarGz {
      archive: openssl.clone(),
      dest: temp_dir.to_path_buf(),
    });
    steps.push(Step::run_in("sudo ./config --prefix=/usr/local/openssl-1.0.2 shared", &openssl_src));
    steps.push(Step::run_in("sudo make", &openssl_src));
    steps.push(Step::run_in("sudo make install", &openssl_src));
    steps.push(Step::remove(&openssl));
  }

  steps.push(Step::run("sudo rm -rf /var/lib/apt/lists/*"));

  let gcc = temp_dir.join("gcc730+ccache.x86_64.tar.xz");
  let usr_local = Path::new("/usr/local");
  steps.push(Step::download(GCC_URL, &gcc));
  steps.push(Step::run_in(format!("ls -l {}", gcc.display()), usr_local));
  steps.push(Step::run_in(
    format!("sudo tar -xJ --strip-components=1 -C /usr/local -f {}", gcc.display()),
    usr_local,
  ));
  steps.push(Step::remove(&gcc));

  for link in [
    "sudo ln -s /usr/lib/x86_64-linux-gnu /usr/lib64",
    "sudo ln -s /usr/include/x86_64-linux-gnu/* /usr/local/include",
    "sudo ln -sf /usr/local/bin/g++-7.3 /usr/bin/g++",
    "sudo ln -sf /usr/local/bin/gcc-7.3 /usr/bin/gcc",
  ] {
    steps.push(Step::run_in(link, usr_local));
  }

  steps.push(Step::PrependEnv {
    name: "LIBRARY_PATH".to_string(),
    value: "/usr/lib/x86_64-linux-gnu".to_string(),
  });
  steps
}

fn windows(variant: Variant) -> Vec<Step> {
  let cygwin_installer = Path::new("C:\\temp\\cygwin.exe");
  let mut steps = vec![
    Step::CreateDir {
      path: PathBuf::from("C:\\cygwin64"),
    },
    Step::CreateDir {
      path: PathBuf::from("C:\\cygwin_packages"),
    },
    Step::download("https://cygwin.com/setup-x86_64.exe", cygwin_installer),
    Step::run(format!(
      "{} --packages {CYGWIN_PACKAGES} --quiet-mode --download --local-install --delete-orphans \
       --site https://mirrors.kernel.org/sourceware/cygwin/ --local-package-dir \"C:\\cygwin_packages\" \
       --root \"C:\\cygwin64\"",
      cygwin_installer.display()
    )),
    Step::run("C:/cygwin64/bin/git config --system core.autocrlf false"),
    Step::AddPath {
      dir: PathBuf::from("C:\\cygwin64\\bin"),
    },
  ];

  if variant != Variant::Openj9 {
    return steps;
  }

  steps.push(Step::download(FREEMARKER_URL, Path::new("c:\\freemarker.jar")));

  let nasm_zip = Path::new("C:\\temp\\nasm.zip");
  steps.extend([
    Step::CreateDir {
      path: PathBuf::from("C:\\nasm"),
    },
    Step::download(NASM_WINDOWS_URL, nasm_zip),
    Step::ExtractZip {
      archive: nasm_zip.to_path_buf(),
      dest: PathBuf::from("C:\\nasm"),
    },
    Step::AddFirstChildToPath {
      dir: PathBuf::from("C:\\nasm"),
    },
    Step::remove(nasm_zip),
  ]);

  let llvm_zip = Path::new("C:\\temp\\llvm.zip");
  steps.extend([
    Step::download(LLVM_WINDOWS_URL, llvm_zip),
    Step::ExtractZip {
      archive: llvm_zip.to_path_buf(),
      dest: PathBuf::from("C:\\"),
    },
    Step::remove(llvm_zip),
    Step::AddPath {
      dir: PathBuf::from("C:\\Program Files\\LLVM\\bin"),
    },
  ]);

  let cuda = Path::new("C:\\temp\\cuda_9.0.176_win10_network-exe.exe");
  steps.extend([
    Step::download(CUDA_WINDOWS_URL, cuda),
    Step::run(format!("{} -s compiler_9.0 nvml_dev_9.0", cuda.display())),
    Step::remove(cuda),
  ]);

  let openssl = Path::new("C:\\temp\\OpenSSL-1.1.1g.tar.gz");
  steps.extend([
    Step::download(OPENSSL_WINDOWS_URL, openssl),
    Step::ExtractTarGz {
      archive: openssl.to_path_buf(),
      dest: PathBuf::from("C:\\temp"),
    },
    Step::AddPath {
      dir: PathBuf::from("C:\\Strawberry\\perl\\bin"),
    },
    Step::run_in(
      ".\\vcvarsall.bat AMD64 && cd C:\\temp\\OpenSSL-1.1.1g && \
       perl C:\\temp\\OpenSSL-1.1.1g\\Configure VC-WIN64A --prefix=C:\\OpenSSL-1.1.1g-x86_64-VS2017 && \
       nmake.exe install > C:\\temp\\openssl64-VS2017.log && nmake.exe -f makefile clean",
      Path::new(VS2017_BUILD_DIR),
    ),
    Step::remove(openssl),
    Step::remove(Path::new("C:\\temp\\OpenSSL-1.1.1g")),
  ]);

  steps
}
