//! General utilities.

/// Convert a library name to the slug used in its page URL.
///
/// Lowercases the name and replaces spaces with hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_library("Far Rockaway"), "far-rockaway");
/// ```
pub fn slugify_library(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_library() {
        assert_eq!(slugify_library("Central Library"), "central-library");
        assert_eq!(slugify_library("Far Rockaway"), "far-rockaway");
        assert_eq!(slugify_library("Astoria"), "astoria");
    }
}
