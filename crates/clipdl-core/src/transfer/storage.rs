//! Destination file lifecycle: write to `.part`, rename into place on success.

use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `clip.mp4` → `clip.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Best-effort removal of a leftover temp file after a failed transfer.
pub(super) fn discard(temp: &Path) {
    match std::fs::remove_file(temp) {
        Ok(()) => tracing::debug!(path = %temp.display(), "discarded partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %temp.display(), "could not discard partial file: {}", e),
    }
}
