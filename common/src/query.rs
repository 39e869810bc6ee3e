use serde::{Deserialize, Serialize};

use crate::listing::Listing;

/// Filter descriptor for browsing listings.
///
/// Category and search compose conjunctively; an empty query matches
/// everything. Results are always returned newest-first by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Exact, case-sensitive match on the canonical category label.
    pub category: Option<String>,
    /// Case-insensitive substring match on the title. Blank or
    /// whitespace-only search strings are ignored.
    pub search: Option<String>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The effective search term: trimmed, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(category) = &self.category {
            if listing.category != *category {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            if !listing.title.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Filter `listings` by `query` and order them newest-first. Stable, so
/// listings sharing a timestamp keep their relative order.
pub fn filter_listings(listings: &[Listing], query: &ListingQuery) -> Vec<Listing> {
    let mut matched: Vec<Listing> = listings
        .iter()
        .filter(|l| query.matches(l))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matched
}
