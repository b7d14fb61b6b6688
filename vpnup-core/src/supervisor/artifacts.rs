//! Secret-bearing files consumed by the tunnel client
//!
//! Both files are owner read/write only. They are written once and left in
//! place for the lifetime of the container.

use crate::error::SupervisorError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use tracing::debug;

/// Permission bits for secret files
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Write `contents` to `path` with mode 0600
///
/// The mode is applied at creation and again afterwards, so a file that
/// already existed with looser bits is tightened as well.
pub fn write_secret_file(path: &Path, contents: &str) -> Result<(), SupervisorError> {
    let to_err = |source: std::io::Error| SupervisorError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_err)?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(SECRET_FILE_MODE)
        .open(path)
        .map_err(to_err)?;
    fs::set_permissions(path, fs::Permissions::from_mode(SECRET_FILE_MODE)).map_err(to_err)?;
    file.write_all(contents.as_bytes()).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote secret file");
    Ok(())
}
