//! Publishes the CLI as self-contained single-file executables.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use argh::{FromArgs, from_env};
use env_logger::Env;
use log::{error, info};

use publish_config::{Environment, Settings};
use publishctl::{Error, Process, config, run};

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, FromArgs)]
/// Build the CLI for Windows, macOS, Linux and Linux (musl).
///
/// Set SKIP_WINDOWS_BUILD, SKIP_MACOS_BUILD, SKIP_LINUX_BUILD or
/// SKIP_LINUX_MUSL_BUILD to skip a platform.
struct Cli {
    /// the custom defines you want to pass to the build process
    #[argh(option, default = "String::new()")]
    extra_defines: String,

    /// a TOML file overriding the project paths
    #[argh(option)]
    config: Option<PathBuf>,

    /// display information about this application
    #[argh(switch)]
    version: bool,
}

impl Cli {
    fn r#do(self) -> Result<()> {
        if self.version {
            print_version();
            return Ok(());
        }
        let project = config::load(self.config.as_deref())?;
        let env = Environment::capture();
        let settings = Settings::new(project, &self.extra_defines, &env)
            .map_err(Error::from)
            .context("invalid extra defines")?;
        let summary = run(&settings, &mut Process)?;
        for (platform, path) in &summary.executables {
            info!("{platform}: {}", path.display());
        }
        Ok(())
    }
}

fn print_version() {
    println!(
        "This is {} {}{}, built as {} for {} on {}.",
        built_info::PKG_NAME,
        built_info::GIT_VERSION.unwrap_or(built_info::PKG_VERSION),
        if built_info::GIT_DIRTY.unwrap_or(false) {
            " (dirty)"
        } else {
            ""
        },
        built_info::PROFILE,
        built_info::TARGET,
        built_info::HOST,
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Cli = from_env();
    match args.r#do() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Map an error to the status this process exits with.
///
/// Codes that don't fit into a status become 1.
fn exit_status(error: &anyhow::Error) -> u8 {
    let code = error.downcast_ref::<Error>().map_or(1, Error::exit_code);
    match u8::try_from(code) {
        Ok(0) | Err(_) => 1,
        Ok(code) => code,
    }
}
