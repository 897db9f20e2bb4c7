//! CMake option assembly.
//!
//! Options are plain strings passed through to `cmake` in append order:
//! base, platform, user, and finally exactly one `-DCMAKE_BUILD_TYPE` flag.
//! Nothing is deduplicated; when a key repeats, CMake's last-wins rule applies.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::inputs::InputError;
use crate::platform::HostEnv;

/// Optimization/debug configuration passed to the build system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BuildType {
  Debug,
  #[default]
  Release,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub const ALL: [BuildType; 4] = [
    BuildType::Debug,
    BuildType::Release,
    BuildType::RelWithDebInfo,
    BuildType::MinSizeRel,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      BuildType::Debug => "Debug",
      BuildType::Release => "Release",
      BuildType::RelWithDebInfo => "RelWithDebInfo",
      BuildType::MinSizeRel => "MinSizeRel",
    }
  }

  pub fn is_debug(&self) -> bool {
    matches!(self, BuildType::Debug)
  }
}

impl FromStr for BuildType {
  type Err = InputError;

  /// Case-insensitive, so `debug` and `Debug` are the same build type.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BuildType::ALL
      .into_iter()
      .find(|bt| bt.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| InputError::InvalidValue {
        name: "build-type".to_string(),
        value: s.to_string(),
        expected: "Debug, Release, RelWithDebInfo or MinSizeRel".to_string(),
      })
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// The `-DCMAKE_BUILD_TYPE=<type>` flag.
pub fn build_type_flag(build_type: BuildType) -> String {
  format!("-DCMAKE_BUILD_TYPE={}", build_type)
}

/// Toolchain flag for a vcpkg checkout announced through `VCPKG_TOOLCHAIN`.
pub fn toolchain_flag(host: &HostEnv) -> Option<String> {
  host
    .non_empty("VCPKG_TOOLCHAIN")
    .map(|toolchain| format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain))
}

/// Flags for one configure step, grouped by where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
  pub build_type: BuildType,
  pub base_options: Vec<String>,
  pub platform_options: Vec<String>,
  pub user_options: Vec<String>,
}

impl BuildConfig {
  pub fn new(build_type: BuildType) -> Self {
    Self {
      build_type,
      ..Default::default()
    }
  }

  pub fn with_base(mut self, options: impl IntoIterator<Item = String>) -> Self {
    self.base_options.extend(options);
    self
  }

  pub fn with_platform(mut self, options: impl IntoIterator<Item = String>) -> Self {
    self.platform_options.extend(options);
    self
  }

  pub fn with_user(mut self, options: impl IntoIterator<Item = String>) -> Self {
    self.user_options.extend(options);
    self
  }

  /// The final option list passed to `cmake`.
  pub fn assemble(&self) -> Vec<String> {
    self
      .base_options
      .iter()
      .chain(&self.platform_options)
      .chain(&self.user_options)
      .cloned()
      .chain(std::iter::once(build_type_flag(self.build_type)))
      .collect()
  }
}

/// Concatenate platform and user flags and append the build-type flag.
pub fn assemble(platform_extra: &[String], user_extra: &[String], build_type: BuildType) -> Vec<String> {
  BuildConfig::new(build_type)
    .with_platform(platform_extra.iter().cloned())
    .with_user(user_extra.iter().cloned())
    .assemble()
}

/// Split an option string into flags.
///
/// Whitespace separates flags; single or double quotes group a value
/// containing spaces and are removed, as a shell would.
pub fn split_flags(input: &str) -> Vec<String> {
  let mut flags = Vec::new();
  let mut current = String::new();
  let mut in_flag = false;
  let mut quote: Option<char> = None;

  for c in input.chars() {
    match quote {
      Some(q) if c == q => quote = None,
      Some(_) => current.push(c),
      None if c == '"' || c == '\'' => {
        quote = Some(c);
        in_flag = true;
      }
      None if c.is_whitespace() => {
        if in_flag {
          flags.push(std::mem::take(&mut current));
          in_flag = false;
        }
      }
      None => {
        current.push(c);
        in_flag = true;
      }
    }
  }
  if in_flag {
    flags.push(current);
  }

  flags
}
