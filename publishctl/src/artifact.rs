use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use super::Error;

/// Make the produced executable runnable by its owner.
///
/// All other permission bits stay as they are.
pub fn mark_executable(path: &Path) -> Result<(), Error> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::MissingArtifact(path.to_path_buf()),
        _ => Error::Io { path: path.to_path_buf(), source },
    })?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    set_owner_executable(path, metadata.permissions())
}

#[cfg(unix)]
fn set_owner_executable(path: &Path, mut permissions: fs::Permissions) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    let mode = permissions.mode();
    permissions.set_mode(mode | 0o100);
    debug!("changing mode of {} from {mode:o} to {:o}", path.display(), permissions.mode());
    fs::set_permissions(path, permissions).map_err(Error::io(path))
}

#[cfg(not(unix))]
fn set_owner_executable(path: &Path, _permissions: fs::Permissions) -> Result<(), Error> {
    debug!("not changing the mode of {}", path.display());
    Ok(())
}
