//! This module reads the version from the project descriptor.
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use roxmltree::{Document, Node};

use publish_config::Settings;

use super::Error;

/// The name of the version file inside the build directory.
pub const VERSION_FILE: &str = "version.txt";

/// Iterate over the texts of all `PropertyGroup/<name>` elements below the root.
fn properties<'a, 'input: 'a>(
    root: Node<'a, 'input>, name: &'a str,
) -> impl Iterator<Item = &'a str> {
    root.children()
        .filter(|node| node.has_tag_name("PropertyGroup"))
        .flat_map(|group| group.children())
        .filter(move |node| node.has_tag_name(name))
        .map(|node| node.text().unwrap_or("").trim())
}

/// Get the version declared in the project descriptor.
///
/// This is the last `VersionPrefix`, followed by the last non-empty
/// `VersionSuffix` (if there is one), separated by a hyphen.
pub fn read_version(descriptor: &Path) -> Result<String, Error> {
    let text = fs::read_to_string(descriptor).map_err(Error::io(descriptor))?;
    let document = Document::parse(&text).map_err(|source| Error::Descriptor {
        path: descriptor.to_path_buf(),
        source,
    })?;
    let root = document.root_element();
    let prefix = properties(root, "VersionPrefix").last().unwrap_or_else(|| {
        warn!("{} doesn't declare a VersionPrefix", descriptor.display());
        ""
    });
    Ok(match properties(root, "VersionSuffix").filter(|s| !s.is_empty()).last() {
        Some(suffix) => format!("{prefix}-{suffix}"),
        None => prefix.to_string(),
    })
}

/// Write the version to the version file, but only when running in a CI job.
///
/// Returns the path of the file if it has been written.
pub fn write_version_file(settings: &Settings) -> Result<Option<PathBuf>, Error> {
    if !settings.ci_job {
        return Ok(None);
    }
    let version = read_version(&settings.project.descriptor)?;
    info!("version: {version}");
    let build_dir = &settings.project.build_dir;
    fs::create_dir_all(build_dir).map_err(Error::io(build_dir))?;
    let path = build_dir.join(VERSION_FILE);
    fs::write(&path, &version).map_err(Error::io(&path))?;
    Ok(Some(path))
}
