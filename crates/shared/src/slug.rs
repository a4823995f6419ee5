use deunicode::deunicode;

/// Derives a URL-safe slug from a title.
///
/// The title is transliterated to ASCII first (`é` becomes `e`). Letters and
/// digits are then kept lowercased; every other run of characters collapses
/// into a single `-`, and separators at either end are dropped. Uniqueness is
/// not checked here.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
#[path = "tests/slug_tests.rs"]
mod tests;
