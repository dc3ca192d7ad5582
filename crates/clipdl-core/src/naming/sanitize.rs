//! Stem sanitization for derived names.

/// Sanitizes a name stem down to `[A-Za-z0-9_-]`.
///
/// - Replaces every other character with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing underscores
///
/// May return an empty string; the caller substitutes a fallback stem.
pub fn sanitize_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    out.trim_matches('_').to_string()
}
