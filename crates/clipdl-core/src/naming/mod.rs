//! Locator modeling and canonical filename derivation.
//!
//! Every discovered locator maps to a `CanonicalId`: the destination filename
//! for the transfer and the key the record store dedups on. Derivation is pure
//! and deterministic, so rediscovering the same locator always lands on the
//! same id.

mod hash;
mod sanitize;

pub use hash::locator_hash;
pub use sanitize::sanitize_stem;

/// Identifier of a downloadable item: destination filename and record key.
pub type CanonicalId = String;

/// Encoding-parameter segment that asks the media host for the unscaled asset.
pub const FIDELITY_SEGMENT: &str = "transcode=true,original=true";

/// Extension every canonical id ends with.
pub const MEDIA_EXTENSION: &str = ".mp4";

/// Stem used when the locator yields no usable name.
const FALLBACK_STEM: &str = "clip-video";

/// Result of deriving a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    /// Locator to hand to the transfer facility (full-fidelity variant).
    pub transfer_locator: String,
    /// Destination filename and record-store key.
    pub canonical_id: CanonicalId,
}

/// Derives the transfer locator and canonical id for a source locator.
///
/// The penultimate path segment (e.g. `transcode=true,width=450`) is replaced
/// with [`FIDELITY_SEGMENT`] and the query is dropped. The final segment is the
/// candidate name; names without the `.mp4` extension are sanitized and
/// suffixed with a hash of the full original locator.
///
/// # Examples
///
/// - `derive("https://cdn.example.com/x/transcode=true,width=450/clip.mp4?x=1")`
///   → `transfer_locator = "https://cdn.example.com/x/transcode=true,original=true/clip.mp4"`,
///   `canonical_id = "clip.mp4"`
/// - `derive("https://cdn.example.com/x/seg/abcXYZ")` → `canonical_id = "abcXYZ-<hash>.mp4"`
pub fn derive(locator: &str) -> DerivedName {
    let (transfer_locator, name) = match url::Url::parse(locator) {
        Ok(parsed) if !parsed.cannot_be_a_base() => split_url(parsed),
        _ => split_raw(locator),
    };

    let canonical_id = if name.ends_with(MEDIA_EXTENSION) {
        name
    } else {
        let stem = sanitize_stem(&name);
        let stem = if stem.is_empty() { FALLBACK_STEM } else { stem.as_str() };
        format!("{}-{}{}", stem, locator_hash(locator), MEDIA_EXTENSION)
    };

    tracing::trace!(locator, %canonical_id, "derived canonical id");

    DerivedName {
        transfer_locator,
        canonical_id,
    }
}

/// Absolute URL: rewrite path segments only, so scheme and host are never touched.
fn split_url(mut parsed: url::Url) -> (String, String) {
    parsed.set_query(None);
    parsed.set_fragment(None);

    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|s| s.map(str::to_string).collect())
        .unwrap_or_default();
    let name = segments.last().cloned().unwrap_or_default();

    if segments.len() >= 2 {
        let idx = segments.len() - 2;
        segments[idx] = FIDELITY_SEGMENT.to_string();
        parsed.set_path(&format!("/{}", segments.join("/")));
    }

    (parsed.to_string(), name)
}

/// Relative or opaque locator: treat it as a plain slash-delimited path.
fn split_raw(locator: &str) -> (String, String) {
    let path = locator
        .split_once('?')
        .map(|(before, _)| before)
        .unwrap_or(locator);

    let mut segments: Vec<&str> = path.split('/').collect();
    let name = segments.last().copied().unwrap_or_default().to_string();

    if segments.len() >= 2 {
        let idx = segments.len() - 2;
        segments[idx] = FIDELITY_SEGMENT;
    }

    (segments.join("/"), name)
}
