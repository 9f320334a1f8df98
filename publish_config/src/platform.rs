use displaydoc::Display;
use strum_macros::EnumIter;

/// The platforms the CLI is being published for.
// The order of the variants is the order in which they are built.
#[derive(Clone, Copy, Debug, Display, EnumIter, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Platform {
    /// Windows
    Windows,
    /// MacOS
    MacOs,
    /// Linux
    Linux,
    /// Linux(Alpine)
    LinuxMusl,
}

impl Platform {
    /// The human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "MacOS",
            Self::Linux => "Linux",
            Self::LinuxMusl => "Linux(Alpine)",
        }
    }

    /// The folder inside the build directory the binary is placed in.
    pub fn output_folder(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::LinuxMusl => "linux-alpine",
        }
    }

    /// The runtime identifier passed to the toolchain.
    pub fn architecture(self) -> &'static str {
        match self {
            Self::Windows => "win-x64",
            Self::MacOs => "osx-x64",
            Self::Linux => "linux-x64",
            Self::LinuxMusl => "linux-musl-x64",
        }
    }

    /// The environment variable whose presence skips this platform.
    pub fn skip_variable(self) -> &'static str {
        match self {
            Self::Windows => "SKIP_WINDOWS_BUILD",
            Self::MacOs => "SKIP_MACOS_BUILD",
            Self::Linux => "SKIP_LINUX_BUILD",
            Self::LinuxMusl => "SKIP_LINUX_MUSL_BUILD",
        }
    }

    /// An older name of the skip variable that is still honoured.
    pub fn legacy_skip_variable(self) -> Option<&'static str> {
        match self {
            Self::LinuxMusl => Some("SKIP_ALPINE_LINUX_BUILD"),
            _ => None,
        }
    }

    /// The file name the toolchain produces for the given executable name.
    pub fn executable_file_name(self, executable: &str) -> String {
        match self {
            Self::Windows => format!("{executable}.exe"),
            _ => executable.to_string(),
        }
    }
}
