//! URL handles for entities.
//!
//! A slug is derived once from the entity's name on creation and stays fixed
//! afterwards. Slugs are unique per kind; collisions get a numeric suffix.

use mintnet_proto::EntityKind;

use crate::error::{Error, Result};

/// Maximum number of suffixed candidates tried before giving up.
pub const MAX_SLUG_ATTEMPTS: usize = 1000;

/// Maximum slug length in bytes, excluding any collision suffix.
pub const MAX_SLUG_LEN: usize = 64;

/// Turn a display name into a slug.
///
/// Lowercases, transliterates German umlauts and sharp s, and collapses every
/// run of other characters into a single `-`. Falls back to the kind name if
/// nothing usable is left.
pub fn slugify(name: &str, kind: EntityKind) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let replacement = match c {
            'ä' => Some("ae"),
            'ö' => Some("oe"),
            'ü' => Some("ue"),
            'ß' => Some("ss"),
            _ => None,
        };

        if replacement.is_none() && !c.is_ascii_alphanumeric() {
            pending_dash = !slug.is_empty();
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        match replacement {
            Some(s) => slug.push_str(s),
            None => slug.push(c),
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        kind.name().to_string()
    } else {
        slug
    }
}

/// Find a free slug starting from `base`.
///
/// Returns `base` itself if `taken` reports it free, otherwise the first free
/// of `base-2`, `base-3`, and so on.
pub fn unique_slug<F>(base: &str, mut taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    if !taken(base)? {
        return Ok(base.to_string());
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(Error::SlugExhausted(base.to_string()))
}
