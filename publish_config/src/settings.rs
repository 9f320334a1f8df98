use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use displaydoc::Display;
use log::debug;
use serde::Deserialize;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::Platform;

/// The presence of this variable marks a CI job; only then the version file is written.
pub const CI_JOB_VARIABLE: &str = "YAMATO_JOB_ID";

/// Additional defines, merged with the ones given on the command line.
pub const EXTRA_DEFINES_VARIABLE: &str = "EXTRA_CLI_DEFINES";

/// A snapshot of environment variables.
///
/// Values are kept as they are, so a variable counts as present whatever its encoding.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: BTreeMap<String, OsString>,
}

impl Environment {
    /// Take a snapshot of the environment of the current process.
    pub fn capture() -> Self {
        Self::from_os(std::env::vars_os())
    }

    /// Build a snapshot from raw pairs.
    ///
    /// Names that are not valid UTF-8 can't be one of ours and are dropped.
    pub fn from_os(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self {
            vars: vars
                .into_iter()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value)))
                .collect(),
        }
    }

    /// Whether the variable is set, whatever its value.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// The raw value of the variable.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }
}

impl<K: Into<String>, V: Into<OsString>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// What to build and where to put it.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    /// the project descriptor passed to the toolchain
    pub descriptor: PathBuf,
    /// the name of the produced executable, without extension
    pub executable: String,
    /// where all outputs are placed
    pub build_dir: PathBuf,
    /// the toolchain's executable
    pub toolchain: String,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            descriptor: PathBuf::from("Unity.Services.Cli/Unity.Services.Cli/Unity.Services.Cli.csproj"),
            executable: "ugs".to_string(),
            build_dir: PathBuf::from("build"),
            toolchain: "dotnet".to_string(),
        }
    }
}

/// The defines could not be passed to the toolchain.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum DefinesError {
    /// the defines contain the control character {0:?}
    ControlCharacter(char),
    /// the defines in {0} are not valid UTF-8
    NotUnicode(&'static str),
}

/// Everything a publish run needs to know.
#[derive(Clone, Debug)]
pub struct Settings {
    pub project: Project,
    /// merged defines; empty if there are none
    pub extra_defines: String,
    /// platforms whose skip variable is set
    pub skipped: BTreeSet<Platform>,
    /// whether this runs as part of a CI job
    pub ci_job: bool,
}

impl Settings {
    /// Assemble the settings from the project, the defines given on the
    /// command line and the environment.
    pub fn new(project: Project, cli_defines: &str, env: &Environment) -> Result<Self, DefinesError> {
        let skipped = Platform::iter()
            .filter(|platform| {
                env.contains(platform.skip_variable())
                    || platform.legacy_skip_variable().is_some_and(|v| env.contains(v))
            })
            .collect();
        let env_defines = env
            .get(EXTRA_DEFINES_VARIABLE)
            .map(|value| value.to_str().ok_or(DefinesError::NotUnicode(EXTRA_DEFINES_VARIABLE)))
            .transpose()?;
        let extra_defines = merge_defines(cli_defines, env_defines);
        validate_defines(&extra_defines)?;
        let settings = Self {
            project,
            extra_defines,
            skipped,
            ci_job: env.contains(CI_JOB_VARIABLE),
        };
        debug!("{settings:?}");
        Ok(settings)
    }

    /// Whether the given platform is going to be built.
    pub fn is_skipped(&self, platform: Platform) -> bool {
        self.skipped.contains(&platform)
    }

    /// The platforms that are going to be built, in build order.
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        Platform::iter().filter(|platform| !self.is_skipped(*platform))
    }
}

/// Combine the defines from the command line and the environment.
pub fn merge_defines(cli: &str, env: Option<&str>) -> String {
    match env {
        Some(env) if !cli.is_empty() && !env.is_empty() => format!("{cli};{env}"),
        Some(env) if cli.is_empty() => env.to_string(),
        _ => cli.to_string(),
    }
}

/// Check that the defines can be passed as a single argument.
///
/// Anything but control characters is passed through verbatim.
pub fn validate_defines(defines: &str) -> Result<(), DefinesError> {
    match defines.chars().find(|c| c.is_control()) {
        Some(c) => Err(DefinesError::ControlCharacter(c)),
        None => Ok(()),
    }
}
