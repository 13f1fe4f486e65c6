//! Allocation-free checks over raw query strings.

use crate::charclass;

/// Check if `input` uses only characters allowed in a query string.
///
/// Allowed are alphanumerics and `-_.~%+=&`, after an optional leading `?`.
/// Escapes are not validated. Empty input is invalid; `?` alone is valid.
pub fn is_valid(input: &[u8]) -> bool {
    if input.is_empty() {
        return false;
    }
    let query = input.strip_prefix(b"?").unwrap_or(input);
    query
        .iter()
        .all(|&b| charclass::is_unreserved(b) || matches!(b, b'%' | b'+' | b'=' | b'&'))
}

/// Count the non-empty `&`-separated segments of `input`.
///
/// A leading `?` is ignored. The count saturates at `u16::MAX`.
pub fn count_pairs(input: &[u8]) -> u16 {
    let query = input.strip_prefix(b"?").unwrap_or(input);
    let segments = query
        .split(|&b| charclass::is_separator(b))
        .filter(|segment| !segment.is_empty())
        .count();
    u16::try_from(segments).unwrap_or(u16::MAX)
}
