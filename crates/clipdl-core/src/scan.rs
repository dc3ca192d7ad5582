//! Directory scan for numerically named media files.
//!
//! Collects file names whose stem is all ASCII digits and that carry an
//! extension (`12345.mp4`), writes them newline-terminated to an output file,
//! and can feed them into the record store so files fetched by other means
//! count as downloaded.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Default output file name, relative to the working directory.
pub const DEFAULT_SCAN_OUTPUT: &str = "scan-results.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Descend into subdirectories.
    Recursive,
    /// Only the top-level directory.
    TopLevel,
}

/// True if `name` has an extension and an all-digit stem.
pub fn is_numeric_media_name(name: &str) -> bool {
    let path = Path::new(name);
    if path.extension().is_none() {
        return false;
    }
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Collects matching file names under `root`. `skip` (usually the output
/// file) is never collected. Entries are visited in name order.
pub fn collect_numeric_files(root: &Path, depth: ScanDepth, skip: Option<&Path>) -> Result<Vec<String>> {
    let meta = fs::metadata(root)
        .with_context(|| format!("root path is not a directory: {}", root.display()))?;
    if !meta.is_dir() {
        bail!("root path is not a directory: {}", root.display());
    }
    let skip = skip.map(absolute);
    let mut found = Vec::new();
    walk(root, depth, skip.as_deref(), &mut found)?;
    Ok(found)
}

fn walk(dir: &Path, depth: ScanDepth, skip: Option<&Path>, found: &mut Vec<String>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if skip.is_some_and(|s| absolute(&path) == s) {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if depth == ScanDepth::Recursive {
                walk(&path, depth, skip, found)?;
            }
            continue;
        }
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %path.display(), "skipping non-UTF-8 file name");
            continue;
        };
        if is_numeric_media_name(name) {
            found.push(name.to_string());
        }
    }
    Ok(())
}

/// Writes `names` newline-terminated (empty file when there are none).
pub fn write_results(output: &Path, names: &[String]) -> Result<()> {
    let content = if names.is_empty() {
        String::new()
    } else {
        format!("{}\n", names.join("\n"))
    };
    fs::write(output, content).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

/// Absolute form of `path` with `.` and `..` resolved lexically, so
/// `dir/sub/../out.txt` and `dir/out.txt` compare equal.
fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
