//! Title to slug conversion

/// Lowercase `title` and collapse every run of characters outside `[a-z0-9]`
/// into a single hyphen, trimming hyphens at both ends.
///
/// Identical titles yield identical slugs; duplicates are not disambiguated.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
