//! Composing the toolchain's command lines.
use std::fmt;
use std::path::Path;
use std::process::Command;

use publish_config::{Platform, Settings};

use super::BUILD_LOG;

/// The fixed arguments of every publish: self-contained, single-file,
/// trimmed, no debug symbols, release configuration.
#[rustfmt::skip]
const PUBLISH_FLAGS: &[&str] = &[
    "--self-contained", "true",
    "--nologo",
    "-p:PublishSingleFile=true",
    "-p:TrimUnusedDependencies=true",
    "-p:DebugType=None",
    "-c", "Release",
];

const DEFINES_PREFIX: &str = "-p:ExtraDefineConstants=";

/// A command line, kept as a list of discrete arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PublishCommand {
    /// The command shared by all platforms.
    pub fn base(settings: &Settings) -> Self {
        let mut args = vec![
            "publish".to_string(),
            settings.project.descriptor.display().to_string(),
        ];
        args.extend(PUBLISH_FLAGS.iter().map(|s| s.to_string()));
        if !settings.extra_defines.is_empty() {
            args.push(format!("{DEFINES_PREFIX}{}", settings.extra_defines));
        }
        Self { program: settings.project.toolchain.clone(), args }
    }

    /// Extend the base command for a specific platform.
    pub fn for_platform(&self, platform: Platform, build_dir: &Path) -> Self {
        let mut command = self.clone();
        command.args.extend([
            "-r".to_string(),
            platform.architecture().to_string(),
            "-o".to_string(),
            build_dir.join(platform.output_folder()).display().to_string(),
            format!(
                "-flp:verbosity=diag;logfile={}",
                build_dir.join(BUILD_LOG).display(),
            ),
        ]);
        command
    }

    /// The value of the defines flag, if there is one.
    pub fn defines(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| arg.strip_prefix(DEFINES_PREFIX))
    }

    /// Get something that can actually be run.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for PublishCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
