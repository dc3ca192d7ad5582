//! Bulk-edit surface: whole record set as editable text.

use super::{RecordError, RecordStore};

/// Splits raw multi-line text into trimmed, non-blank lines.
pub fn split_bulk_text(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Replaces the record set with the lines of `text` and returns the
/// canonical text (what was actually stored, one id per line) for redisplay.
pub async fn apply_bulk_edit(store: &RecordStore, text: &str) -> Result<String, RecordError> {
    let stored = store.replace_all(split_bulk_text(text)).await?;
    Ok(stored.join("\n"))
}
