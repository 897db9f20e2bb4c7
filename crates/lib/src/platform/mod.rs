//! Host platform detection and per-OS behaviour.

mod env;
mod os;
mod profile;

pub use env::{EnvScope, HostEnv};
pub use os::Os;
pub use profile::{
  Compiler, GIT_MINGW_BIN, NO_PYTHON_BINDING_FLAG, PYTHON_BINDINGS_FLAG, PathFixup, PlatformProfile,
  WINDOWS_INSTALL_BIN, WINDOWS_INSTALL_PREFIX, boost_library_fixup, resolve,
};
