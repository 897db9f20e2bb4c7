use anyhow::Result;
use clap::Args;

use cibuild_lib::options::{BuildType, toolchain_flag};
use cibuild_lib::platform::{Compiler, HostEnv, resolve};

use super::host_os;
use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning};

#[derive(Debug, Args)]
pub struct InfoArgs {
  /// Build type to resolve the profile for
  #[arg(long, env = "INPUT_BUILD-TYPE", default_value_t = BuildType::Release)]
  pub build_type: BuildType,

  /// Compiler to resolve the profile for
  #[arg(long, env = "INPUT_COMPILER", default_value = "gcc")]
  pub compiler: Compiler,

  /// Output format
  #[arg(short, long, value_enum, default_value_t)]
  pub format: OutputFormat,
}

pub fn cmd_info(args: InfoArgs) -> Result<()> {
  let os = host_os()?;
  let host = HostEnv::capture();
  let profile = resolve(os, &args.compiler, args.build_type, &host);

  if args.format.is_json() {
    let json = serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "package_manager": os.package_manager(),
      "build_type": args.build_type,
      "toolchain": toolchain_flag(&host),
      "profile": profile,
    });
    print_json(&json)?;
    return Ok(());
  }

  print_success(&format!("cibuild v{}", env!("CARGO_PKG_VERSION")));
  print_stat("OS", os.as_str());
  print_stat("Package manager", os.package_manager());
  print_stat("Compiler", &profile.compiler.to_string());
  print_stat("Sudo", &profile.sudo_required.to_string());
  print_stat("CMake options", &profile.cmake_options.join(" "));
  for (name, value) in &profile.exports {
    print_stat("Export", &format!("{}={}", name, value));
  }
  for fixup in &profile.path_fixups {
    print_stat("Path fix-up", &format!("{} <- {}", fixup.variable, fixup.prepend.join(&fixup.separator.to_string())));
  }
  if let Some(warning) = profile.compiler_warning() {
    print_warning(&warning);
  }
  Ok(())
}
