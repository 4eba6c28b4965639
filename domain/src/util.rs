//! Shared utility functions.

/// The first `max_chars` characters of `s`, or all of `s` if it is shorter.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Lowercase a technology name into the key used for its cached docs
/// directory (`@scope/pkg` → `scope-pkg`).
pub fn normalize_tech_name(name: &str) -> String {
    name.trim().to_lowercase().replace('/', "-").replace('@', "")
}
