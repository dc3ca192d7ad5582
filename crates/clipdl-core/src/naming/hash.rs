//! Stable locator checksum used to disambiguate derived names.

/// 32-bit rolling checksum (`h = h * 31 + unit`, wrapping) over the UTF-16
/// code units of `locator`, returned as an absolute value.
///
/// Not collision resistant; it only has to be stable for a given locator.
pub fn locator_hash(locator: &str) -> u32 {
    locator
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .unsigned_abs()
}
