//! This crate contains integration tests.
#![cfg(test)]
use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use strum::IntoEnumIterator;
use tempfile::{TempDir, tempdir};

use publish_config::{CI_JOB_VARIABLE, EXTRA_DEFINES_VARIABLE, Environment, Platform, Project, Settings};
use publishctl::{Error, PublishCommand, Summary, Toolchain, VERSION_FILE, run};

#[ctor::ctor]
fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .init();
}

/// Pretends to be the toolchain and records what it has been asked to do.
#[derive(Default)]
struct FakeToolchain {
    commands: Vec<PublishCommand>,
    /// exit with this code when building for this architecture
    fail: Option<(&'static str, i32)>,
    /// report success but don't produce anything
    produce_nothing: bool,
}

impl FakeToolchain {
    fn architectures(&self) -> Vec<String> {
        self.commands.iter().map(|c| value_after(c, "-r")).collect()
    }
}

fn value_after(command: &PublishCommand, flag: &str) -> String {
    let index = command.args.iter().position(|a| a == flag).expect("flag is missing");
    command.args[index + 1].clone()
}

impl Toolchain for FakeToolchain {
    fn execute(&mut self, command: &PublishCommand) -> io::Result<Option<i32>> {
        self.commands.push(command.clone());
        let architecture = value_after(command, "-r");
        if let Some((failing, code)) = self.fail {
            if failing == architecture {
                return Ok(Some(code));
            }
        }
        if !self.produce_nothing {
            let output = PathBuf::from(value_after(command, "-o"));
            fs::create_dir_all(&output)?;
            let name = if architecture.starts_with("win") { "ugs.exe" } else { "ugs" };
            fs::write(output.join(name), b"MZ")?;
        }
        Ok(Some(0))
    }
}

fn project(dir: &TempDir) -> Result<Project> {
    let descriptor = dir.path().join("Cli.csproj");
    fs::write(
        &descriptor,
        "<Project Sdk=\"Microsoft.NET.Sdk\"><PropertyGroup>\
         <VersionPrefix>1.2.3</VersionPrefix><VersionSuffix>beta</VersionSuffix>\
         </PropertyGroup></Project>",
    )?;
    Ok(Project {
        descriptor,
        build_dir: dir.path().join("build"),
        ..Default::default()
    })
}

fn settings(dir: &TempDir, cli_defines: &str, env: &[(&str, &str)]) -> Result<Settings> {
    let env: Environment = env.iter().copied().collect();
    Ok(Settings::new(project(dir)?, cli_defines, &env)?)
}

#[test]
fn builds_every_platform_in_order() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "", &[])?;
    let mut toolchain = FakeToolchain::default();
    let summary = run(&settings, &mut toolchain)?;
    assert_eq!(
        toolchain.architectures(),
        ["win-x64", "osx-x64", "linux-x64", "linux-musl-x64"],
    );
    assert_eq!(summary.version_file, None);
    assert!(!settings.project.build_dir.join(VERSION_FILE).exists());
    let platforms: Vec<Platform> = summary.executables.iter().map(|(p, _)| *p).collect();
    assert_eq!(platforms, Platform::iter().collect::<Vec<_>>());
    for (_, path) in &summary.executables {
        assert!(path.is_file());
    }
    Ok(())
}

#[test]
fn skipped_platforms_are_not_attempted() -> Result<()> {
    let all: Vec<Platform> = Platform::iter().collect();
    for mask in 0u8..16 {
        let dir = tempdir()?;
        let env: Vec<(&str, &str)> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, p)| (p.skip_variable(), "1"))
            .collect();
        let settings = settings(&dir, "", &env)?;
        let mut toolchain = FakeToolchain::default();
        run(&settings, &mut toolchain)?;
        let expected: Vec<&str> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) == 0)
            .map(|(_, p)| p.architecture())
            .collect();
        assert_eq!(toolchain.architectures(), expected, "mask {mask:#06b}");
    }
    Ok(())
}

#[test]
fn everything_skipped_still_succeeds() -> Result<()> {
    let dir = tempdir()?;
    let env: Vec<(&str, &str)> = Platform::iter().map(|p| (p.skip_variable(), "")).collect();
    let settings = settings(&dir, "", &env)?;
    let mut toolchain = FakeToolchain::default();
    assert_eq!(run(&settings, &mut toolchain)?, Summary::default());
    assert!(toolchain.commands.is_empty());
    assert!(settings.project.build_dir.is_dir());
    Ok(())
}

#[test]
fn defines_reach_every_platform() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "A", &[(EXTRA_DEFINES_VARIABLE, "B")])?;
    let mut toolchain = FakeToolchain::default();
    run(&settings, &mut toolchain)?;
    assert_eq!(toolchain.commands.len(), 4);
    for command in &toolchain.commands {
        assert_eq!(command.defines(), Some("A;B"));
    }
    Ok(())
}

#[test]
fn version_file_in_ci() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "", &[(CI_JOB_VARIABLE, "42")])?;
    let summary = run(&settings, &mut FakeToolchain::default())?;
    let path = summary.version_file.expect("no version file");
    assert_eq!(fs::read_to_string(path)?, "1.2.3-beta");
    Ok(())
}

#[test]
fn broken_descriptor_stops_before_building() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "", &[(CI_JOB_VARIABLE, "42")])?;
    fs::write(&settings.project.descriptor, "<Project>")?;
    let mut toolchain = FakeToolchain::default();
    let result = run(&settings, &mut toolchain);
    assert!(matches!(result, Err(Error::Descriptor { .. })));
    assert!(toolchain.commands.is_empty());
    Ok(())
}

#[test]
fn failure_stops_the_run() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "", &[])?;
    let mut toolchain = FakeToolchain {
        fail: Some(("osx-x64", 3)),
        ..Default::default()
    };
    match run(&settings, &mut toolchain) {
        Err(error @ Error::ToolchainFailed { platform: Platform::MacOs, code: Some(3) }) => {
            assert_eq!(error.exit_code(), 3);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(toolchain.architectures(), ["win-x64", "osx-x64"]);
    // what has been built before stays
    assert!(publishctl::executable_path(&settings, Platform::Windows).is_file());
    Ok(())
}

#[test]
fn missing_executable_is_an_error() -> Result<()> {
    let dir = tempdir()?;
    let settings = settings(&dir, "", &[])?;
    let mut toolchain = FakeToolchain {
        produce_nothing: true,
        ..Default::default()
    };
    match run(&settings, &mut toolchain) {
        Err(Error::MissingArtifact(path)) => {
            assert_eq!(path, publishctl::executable_path(&settings, Platform::Windows));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(toolchain.commands.len(), 1);
    Ok(())
}

#[cfg(unix)]
mod process {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use publishctl::Process;

    use super::*;

    /// A stand-in for the toolchain that creates the expected output.
    const FAKE_DOTNET: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift ;;
        -r) rid="$2"; shift ;;
    esac
    shift
done
mkdir -p "$out"
case "$rid" in
    win-*) touch "$out/ugs.exe" ;;
    *) touch "$out/ugs" ;;
esac
"#;

    fn fake_dotnet(dir: &Path) -> Result<String> {
        let path = dir.join("fake-dotnet");
        fs::write(&path, FAKE_DOTNET)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path.display().to_string())
    }

    #[test]
    fn real_processes() -> Result<()> {
        let dir = tempdir()?;
        let mut project = project(&dir)?;
        project.toolchain = fake_dotnet(dir.path())?;
        let env: Environment = [(Platform::Windows.skip_variable(), "")].into_iter().collect();
        let settings = Settings::new(project, "", &env)?;
        let summary = run(&settings, &mut Process)?;
        assert_eq!(summary.executables.len(), 3);
        for (_, path) in &summary.executables {
            let mode = fs::metadata(path)?.permissions().mode();
            assert_eq!(mode & 0o100, 0o100, "{} is not executable", path.display());
        }
        Ok(())
    }
}
