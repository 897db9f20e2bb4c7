mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cibuild_lib::job::Job;

use crate::cmd::{
  BuildProjectArgs, ConanPackageArgs, InfoArgs, InstallDepsArgs, cmd_build_project, cmd_conan_package, cmd_info,
  cmd_install_deps,
};
use crate::output::print_error;

/// CI actions for CMake projects: build, package with Conan, install dependencies
#[derive(Parser)]
#[command(name = "cibuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Configure, build, install and test a CMake project
  BuildProject(BuildProjectArgs),

  /// Create a Conan package and upload it
  ConanPackage(ConanPackageArgs),

  /// Install system packages and source-built GitHub dependencies
  InstallDeps(InstallDepsArgs),

  /// Show the platform profile for this host
  Info(InfoArgs),
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::BuildProject(args) => cmd_build_project(args),
    Commands::ConanPackage(args) => cmd_conan_package(args),
    Commands::InstallDeps(args) => cmd_install_deps(args),
    Commands::Info(args) => cmd_info(args),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::debug!(error = ?err, "command failed");
      let message = format!("{:#}", err);
      Job::set_failed(&message);
      print_error(&message);
      ExitCode::FAILURE
    }
  }
}
