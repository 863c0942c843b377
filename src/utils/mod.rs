//! Project-specific utilities live here.

/// Case-insensitive substring test used by catalog search.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
