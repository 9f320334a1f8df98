//! This module contains functions to load the project configuration.
//!
//! The configuration can come from a file; without one, the defaults are used.
//! The structs themselves can be found in the `publish_config` crate.
use std::fs::read_to_string;
use std::path::Path;

use log::info;
use serde::Deserialize;

use publish_config::Project;

use super::Error;

/// The layout of a configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct File {
    #[serde(default)]
    project: Project,
}

/// Get the project configuration.
/// If a file is given, read and parse it. Otherwise, use the defaults.
pub fn load(file_name: Option<&Path>) -> Result<Project, Error> {
    match file_name {
        Some(path) => read_file(path),
        None => Ok(Project::default()),
    }
}

/// Try to read and parse the configuration from the given file.
fn read_file(path: &Path) -> Result<Project, Error> {
    info!("loading configuration from {}", path.display());
    let text = read_to_string(path).map_err(Error::io(path))?;
    let file: File = toml::from_str(&text).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.project)
}
