//! Slug derivation for project names.
//!
//! A slug is the URL- and filesystem-safe token a project is addressed by:
//! - ASCII letters and digits are kept, lowercased
//! - every other run of characters collapses to a single `-`
//! - no leading or trailing `-`
//!
//! The result never contains the location separator `.`, so a slug is always
//! usable as a single location segment.

/// The character runs of non-alphanumerics collapse to.
const SLUG_SEPARATOR: char = '-';

/// Derive a slug from free text.
///
/// Stable: calling it on its own output returns the same slug.
///
/// # Examples
///
/// ```
/// use wp_types::slugify;
///
/// assert_eq!(slugify("My First Project!"), "my-first-project");
/// assert_eq!(slugify("  The Week  Project "), "the-week-project");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SLUG_SEPARATOR);
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
