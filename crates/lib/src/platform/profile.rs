//! Per-OS build behaviour.
//!
//! [`resolve`] turns the host OS, the requested compiler and build type into
//! an immutable [`PlatformProfile`]: the sudo policy, the CMake flags every
//! build on this platform needs, the variables to export to the job, and the
//! search-path fix-ups to apply.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::Os;
use super::env::HostEnv;
use crate::options::BuildType;

/// Flag enabling both Python 2 and Python 3 bindings on Unix hosts.
pub const PYTHON_BINDINGS_FLAG: &str = "-DPYTHON_BINDING_BUILD_PYTHON2_AND_PYTHON3:BOOL=ON";

/// Flag disabling Python bindings, required for Windows debug builds.
pub const NO_PYTHON_BINDING_FLAG: &str = "-DPYTHON_BINDING:BOOL=OFF";

/// Install prefix used on Windows hosts.
pub const WINDOWS_INSTALL_PREFIX: &str = "C:/devel/install";

/// Binary directory of [`WINDOWS_INSTALL_PREFIX`].
pub const WINDOWS_INSTALL_BIN: &str = r"C:\devel\install\bin";

/// Git's MinGW runtime stays on `PATH`; it carries the gfortran libraries.
pub const GIT_MINGW_BIN: &str = r"C:\Program Files\Git\mingw64\bin";

/// Compiler selected for Unix builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
  #[default]
  Gcc,
  Clang,
  /// Passed through unchanged, with a warning.
  Other(String),
}

impl FromStr for Compiler {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s.trim() {
      "" | "gcc" => Compiler::Gcc,
      "clang" => Compiler::Clang,
      other => Compiler::Other(other.to_string()),
    })
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Compiler::Gcc => write!(f, "gcc"),
      Compiler::Clang => write!(f, "clang"),
      Compiler::Other(name) => write!(f, "{}", name),
    }
  }
}

/// Rewrite of a separator-delimited search path variable.
///
/// Entries containing `hide_token` are dropped unless listed in `keep`, then
/// every `prepend` entry that is missing is put at the front, in order.
/// Applying a fix-up to its own result changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFixup {
  pub variable: String,
  pub separator: char,
  pub hide_token: Option<String>,
  pub keep: Vec<String>,
  pub prepend: Vec<String>,
  /// Export the result to the rest of the job instead of scoping it to this run.
  pub persist: bool,
}

impl PathFixup {
  pub fn prepend(variable: &str, separator: char, entries: Vec<String>) -> Self {
    Self {
      variable: variable.to_string(),
      separator,
      hide_token: None,
      keep: Vec::new(),
      prepend: entries,
      persist: false,
    }
  }

  pub fn persistent(mut self) -> Self {
    self.persist = true;
    self
  }

  pub fn apply(&self, current: &str) -> String {
    let mut entries: Vec<&str> = current
      .split(self.separator)
      .filter(|entry| !entry.is_empty())
      .filter(|entry| match &self.hide_token {
        Some(token) => !entry.contains(token.as_str()) || self.keep.iter().any(|k| k == entry),
        None => true,
      })
      .collect();

    for entry in self.prepend.iter().rev() {
      if !entries.contains(&entry.as_str()) {
        entries.insert(0, entry.as_str());
      }
    }

    entries.join(&self.separator.to_string())
  }
}

/// Immutable per-run description of how to build on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
  pub os: Os,
  pub compiler: Compiler,
  pub sudo_required: bool,
  /// CMake flags mandated by the platform, in order.
  pub cmake_options: Vec<String>,
  /// Variables exported to the job before anything runs.
  pub exports: Vec<(String, String)>,
  pub path_fixups: Vec<PathFixup>,
}

impl PlatformProfile {
  /// Warning to surface when the compiler is not one this tool knows.
  pub fn compiler_warning(&self) -> Option<String> {
    match &self.compiler {
      Compiler::Other(name) if self.os != Os::Windows => Some(format!(
        "Compiler is set to {} which is not recognized by this action",
        name
      )),
      _ => None,
    }
  }

  /// Extra system packages needed for the selected compiler.
  pub fn compiler_packages(&self) -> &'static [&'static str] {
    match (self.os, &self.compiler) {
      (Os::Linux, Compiler::Clang) => &["clang"],
      _ => &[],
    }
  }
}

/// Derive the [`PlatformProfile`] for `os`.
pub fn resolve(os: Os, compiler: &Compiler, build_type: BuildType, host: &HostEnv) -> PlatformProfile {
  let mut profile = PlatformProfile {
    os,
    compiler: compiler.clone(),
    sudo_required: os != Os::Windows,
    cmake_options: Vec::new(),
    exports: Vec::new(),
    path_fixups: Vec::new(),
  };

  match os {
    Os::Linux | Os::MacOs => {
      profile.cmake_options.push(PYTHON_BINDINGS_FLAG.to_string());
      if *compiler == Compiler::Clang {
        profile.exports.extend(
          [("CC", "clang"), ("CXX", "clang++"), ("CCC_CXX", "clang++")]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        );
      }
      if os == Os::Linux {
        profile
          .path_fixups
          .push(PathFixup::prepend("LD_LIBRARY_PATH", ':', vec!["/usr/local/lib".to_string()]).persistent());
      }
    }
    Os::Windows => {
      profile
        .cmake_options
        .push(format!("-DCMAKE_INSTALL_PREFIX={}", WINDOWS_INSTALL_PREFIX));
      if build_type.is_debug() {
        profile.cmake_options.push(NO_PYTHON_BINDING_FLAG.to_string());
      }

      let boost_root = match host.non_empty("BOOST_ROOT") {
        Some(root) => Some(root.to_string()),
        None => {
          let fallback = host.non_empty("BOOST_ROOT_1_69_0").map(str::to_string);
          if let Some(root) = &fallback {
            profile.exports.push(("BOOST_ROOT".to_string(), root.clone()));
          }
          fallback
        }
      };

      let mut prepend = vec![WINDOWS_INSTALL_BIN.to_string()];
      prepend.extend(boost_root.map(|root| boost_lib(&root)));
      profile.path_fixups.push(PathFixup {
        variable: "PATH".to_string(),
        separator: ';',
        hide_token: Some("Git".to_string()),
        keep: vec![GIT_MINGW_BIN.to_string()],
        prepend,
        persist: false,
      });
    }
  }

  profile
}

/// Persistent `PATH` fix-up putting `<BOOST_ROOT>\lib` first, used when
/// installing Windows dependencies.
pub fn boost_library_fixup(host: &HostEnv) -> Option<PathFixup> {
  let root = host.non_empty("BOOST_ROOT")?;
  Some(PathFixup::prepend("PATH", ';', vec![boost_lib(root)]).persistent())
}

fn boost_lib(root: &str) -> String {
  format!(r"{}\lib", root.trim_end_matches('\\'))
}
