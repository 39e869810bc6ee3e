use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default location stamped on listings created without one.
pub const DEFAULT_LOCATION: &str = "Palo Alto, CA";

/// Unique listing identifier (timestamp-based, opaque to callers).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A marketplace listing. Listings are created once and never edited
/// or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    /// Price in US cents, so values round-trip exactly.
    pub price_cents: u64,
    /// Canonical category label, e.g. "Home Goods".
    pub category: String,
    pub location: String,
    pub description: String,
    pub seller_email: String,
    /// Folder in blob storage holding this listing's photos, if any.
    /// Individual file names are never stored on the listing itself.
    pub image_folder: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Vehicle sub-record, present only for listings in the "Vehicles"
/// category. Keyed by the owning listing, created atomically with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub listing_id: ListingId,
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    pub mileage: Option<u32>,
}

/// Parse a user-typed dollar amount ("150", "150.25", "$1,200") into
/// cents. Returns `None` for negative, malformed, or over-precise input.
pub fn parse_price(input: &str) -> Option<u64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() || cleaned.starts_with('-') || cleaned.starts_with('+') {
        return None;
    }

    let (dollars, cents) = match cleaned.split_once('.') {
        Some((d, c)) => (d, c),
        None => (cleaned.as_str(), ""),
    };
    if cents.len() > 2 || (dollars.is_empty() && cents.is_empty()) {
        return None;
    }
    if !dollars.chars().all(|c| c.is_ascii_digit())
        || !cents.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let dollar_part: u64 = if dollars.is_empty() {
        0
    } else {
        dollars.parse().ok()?
    };
    let cent_part: u64 = match cents.len() {
        0 => 0,
        1 => cents.parse::<u64>().ok()? * 10,
        _ => cents.parse().ok()?,
    };
    dollar_part
        .checked_mul(100)
        .and_then(|d| d.checked_add(cent_part))
}
