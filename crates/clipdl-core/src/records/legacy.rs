//! Legacy record representation: a JSON object keyed by source locator whose
//! values carry a `fileName` field, e.g.
//! `{"https://.../clip.mp4": {"fileName": "clip.mp4", "time": 1700000000}}`.

use serde_json::Value;

/// Extracts filenames if `raw` is the legacy JSON object form; `None` otherwise.
///
/// Entries without a non-empty string `fileName` are dropped.
pub(super) fn decode(raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        return None;
    };

    Some(
        map.values()
            .filter_map(|record| record.get("fileName"))
            .filter_map(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
