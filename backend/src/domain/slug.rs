//! Trip slug helpers.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. They are unique per owner by convention;
//! the store does not enforce it.

/// Slug used when a name contains no usable characters.
pub const FALLBACK_SLUG: &str = "trip";

/// Return `true` when `value` is a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && has_allowed_slug_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a URL-safe slug from free text.
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single hyphen; leading and trailing hyphens are dropped.
///
/// # Examples
/// ```
/// use itinerary::domain::slugify;
///
/// assert_eq!(slugify("  Lisbon & Porto 2024! "), "lisbon-porto-2024");
/// assert_eq!(slugify("???"), "trip");
/// ```
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// Return the first of `base`, `base-2`, `base-3`, … not rejected by
/// `taken`.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_owned();
    }
    (2_u32..)
        .map(|suffix| format!("{base}-{suffix}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_owned())
}
