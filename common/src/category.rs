use thiserror::Error;

/// Every category a listing can carry, as shown in the browse sidebar.
pub const CATEGORIES: [&str; 19] = [
    "Vehicles",
    "Property Rentals",
    "Apparel",
    "Classifieds",
    "Electronics",
    "Entertainment",
    "Family",
    "Free Stuff",
    "Garden & Outdoor",
    "Hobbies",
    "Home Goods",
    "Home Improvement",
    "Home Sales",
    "Musical Instrument",
    "Office Supplies",
    "Pet Supplies",
    "Sporting Goods",
    "Toys & Games",
    "Buy and Sell groups",
];

/// Categories offered by the item-creation form. Vehicles have their own
/// flow, and group listings are not user-creatable.
pub fn item_categories() -> impl Iterator<Item = &'static str> {
    CATEGORIES
        .iter()
        .copied()
        .filter(|c| *c != "Vehicles" && *c != "Buy and Sell groups")
}

/// Whether `label` is one of the fixed category labels (case-insensitive).
pub fn is_known_category(label: &str) -> bool {
    CATEGORIES.iter().any(|c| c.eq_ignore_ascii_case(label))
}

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("malformed category slug: {0}")]
    Decode(String),
}

/// Turn a category label into a URL-safe slug: lowercase, runs of
/// whitespace collapsed to a single hyphen. `&` is kept as-is and
/// percent-encoded at the routing layer.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_hyphen = false;
    for ch in label.trim().chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        }
    }
    slug
}

/// Recover a category label from a slug.
///
/// Fixed labels resolve exactly, accepting both the literal slug
/// ("garden-&-outdoor") and the spelled-out variant ("garden-and-outdoor").
/// Anything else falls back to a best-effort heuristic: hyphens become
/// spaces, fragments are title-cased, and literal "&"/"and" tokens are
/// preserved. The heuristic is not a strict inverse of [`slugify`].
pub fn unslug(slug: &str) -> String {
    let wanted = slug.to_lowercase();
    for label in CATEGORIES {
        let canonical = slugify(label);
        if wanted == canonical || wanted == canonical.replace('&', "and") {
            return label.to_string();
        }
    }

    let mut words = Vec::new();
    for word in wanted.split('-') {
        if word == "and" {
            words.push("and".to_string());
            continue;
        }
        for fragment in split_on_ampersand(word) {
            match fragment {
                "&" => words.push("&".to_string()),
                other if !other.is_empty() => words.push(title_case(other)),
                _ => {}
            }
        }
    }
    words.join(" ")
}

/// Percent-decode a route parameter and resolve it to a category label.
/// Invalid encodings surface as [`SlugError::Decode`] so the caller can
/// render a not-found state instead of crashing.
pub fn resolve_category(raw: &str) -> Result<String, SlugError> {
    let decoded = urlencoding::decode(raw).map_err(|e| SlugError::Decode(e.to_string()))?;
    Ok(unslug(&decoded))
}

/// Split a word on literal `&`, keeping the connector as its own token.
fn split_on_ampersand(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = word;
    while let Some(idx) = rest.find('&') {
        parts.push(&rest[..idx]);
        parts.push("&");
        rest = &rest[idx + 1..];
    }
    parts.push(rest);
    parts
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
