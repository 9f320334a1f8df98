//! This crate publishes the CLI for all supported platforms.
//!
//! The actual work is done by an external toolchain; this only decides what to
//! build, composes the command lines and checks the results.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use strum::IntoEnumIterator;
use thiserror::Error;

use publish_config::{DefinesError, Platform, Settings};

mod artifact;
mod command;
pub mod config;
mod toolchain;
mod version;

pub use artifact::mark_executable;
pub use command::PublishCommand;
pub use toolchain::{Process, Toolchain};
pub use version::{VERSION_FILE, read_version, write_version_file};

/// Where the toolchain writes its diagnostic log, relative to the build directory.
pub const BUILD_LOG: &str = "build.log";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse project descriptor {}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("invalid configuration file {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Defines(#[from] DefinesError),
    #[error("failed to run the toolchain for {platform}")]
    Spawn {
        platform: Platform,
        #[source]
        source: io::Error,
    },
    #[error("the toolchain failed for {platform} ({})", describe_code(.code))]
    ToolchainFailed { platform: Platform, code: Option<i32> },
    #[error("expected executable {} does not exist", .0.display())]
    MissingArtifact(PathBuf),
    #[error("expected executable {} is not a file", .0.display())]
    NotAFile(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// The exit code this process should terminate with.
    ///
    /// A failing toolchain passes its own code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolchainFailed { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by a signal".to_string(),
    }
}

/// What a successful run produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub version_file: Option<PathBuf>,
    pub executables: Vec<(Platform, PathBuf)>,
}

/// The path of the executable the toolchain produces for a platform.
pub fn executable_path(settings: &Settings, platform: Platform) -> PathBuf {
    [
        settings.project.build_dir.as_path(),
        Path::new(platform.output_folder()),
        Path::new(&platform.executable_file_name(&settings.project.executable)),
    ]
    .into_iter()
    .collect()
}

/// Build for a single platform.
///
/// Returns the path of the produced executable or None if the platform is skipped.
pub fn build_platform(
    settings: &Settings,
    base: &PublishCommand,
    platform: Platform,
    toolchain: &mut dyn Toolchain,
) -> Result<Option<PathBuf>, Error> {
    if settings.is_skipped(platform) {
        info!("skipping {platform} build");
        return Ok(None);
    }
    info!("building {platform}");
    let command = base.for_platform(platform, &settings.project.build_dir);
    info!("running {command}");
    match toolchain
        .execute(&command)
        .map_err(|source| Error::Spawn { platform, source })?
    {
        Some(0) => info!("{platform} build finished"),
        code => return Err(Error::ToolchainFailed { platform, code }),
    }
    let executable = executable_path(settings, platform);
    mark_executable(&executable)?;
    Ok(Some(executable))
}

/// Publish for every platform that is not skipped, one after another.
///
/// The first failure stops the run; platforms built before stay in place.
pub fn run(settings: &Settings, toolchain: &mut dyn Toolchain) -> Result<Summary, Error> {
    let build_dir = &settings.project.build_dir;
    fs::create_dir_all(build_dir).map_err(Error::io(build_dir))?;
    let version_file = write_version_file(settings)?;

    let included: Vec<&str> = settings.platforms().map(Platform::name).collect();
    info!(
        "building {} for {} in {}",
        settings.project.executable,
        if included.is_empty() { "no platforms".to_string() } else { included.join(" ") },
        build_dir.display(),
    );

    let base = PublishCommand::base(settings);
    let mut executables = Vec::new();
    for platform in Platform::iter() {
        if let Some(path) = build_platform(settings, &base, platform, toolchain)? {
            executables.push((platform, path));
        }
    }
    Ok(Summary { version_file, executables })
}
