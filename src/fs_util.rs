use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use tracing::{info, warn};

use crate::config::OutputOwner;
use crate::error::EpgError;

/// Write `content` to `path` through a temp file in the same directory.
pub fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), EpgError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| EpgError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(".loop-epg")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| EpgError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| EpgError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| EpgError::Filesystem(format!("persist {path}: {}", err.error)))?;
    Ok(())
}

/// Best-effort ownership and mode change of a written guide.
///
/// Each step is attempted on its own and failures are logged only, so a
/// refused chown still leaves the requested mode in place.
pub fn adjust_permissions(path: &Utf8Path, owner: Option<OutputOwner>, mode: Option<u32>) {
    if let Some(owner) = owner {
        match change_owner(path, owner) {
            Ok(()) => info!(
                "File ownership changed to {}:{} for {path}",
                owner.uid, owner.gid
            ),
            Err(err) => warn!(
                "Error changing file ownership to {}:{} for {path}: {err}",
                owner.uid, owner.gid
            ),
        }
    }
    if let Some(mode) = mode {
        match change_mode(path, mode) {
            Ok(()) => info!("Permissions set to {mode:o} for {path}"),
            Err(err) => warn!("Error setting permissions {mode:o} for {path}: {err}"),
        }
    }
}

#[cfg(unix)]
fn change_owner(path: &Utf8Path, owner: OutputOwner) -> io::Result<()> {
    std::os::unix::fs::chown(path.as_std_path(), Some(owner.uid), Some(owner.gid))
}

#[cfg(unix)]
fn change_mode(path: &Utf8Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path.as_std_path(), fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn change_owner(_path: &Utf8Path, _owner: OutputOwner) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "ownership change is not supported on this platform",
    ))
}

#[cfg(not(unix))]
fn change_mode(_path: &Utf8Path, _mode: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "mode change is not supported on this platform",
    ))
}
