use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::ListingId;

/// Unique identifier for a message (random u64, same pattern as ListingId
/// is to listings).
pub type MessageId = u64;

/// Title shown for a conversation whose listing can no longer be resolved.
pub const UNTITLED_LISTING: &str = "Untitled Listing";

/// One chat message about a listing. Messages are append-only and are
/// totally ordered per listing by `created_at`, ties broken by arrival
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub listing_id: ListingId,
    pub buyer_email: String,
    pub seller_email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Time-ordered message log for one listing's conversation.
///
/// Merges a one-shot history load with live append events. The merge is
/// idempotent: duplicate ids are dropped, and a live message dated before
/// the tail of the log is dropped rather than inserted out of position.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    seen: BTreeSet<MessageId>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the log with a freshly loaded history. The history is
    /// stable-sorted by timestamp (preserving insertion order for ties)
    /// and de-duplicated by id.
    pub fn load(&mut self, mut history: Vec<Message>) {
        history.sort_by_key(|m| m.created_at);
        self.messages.clear();
        self.seen.clear();
        for message in history {
            if self.seen.insert(message.id) {
                self.messages.push(message);
            }
        }
    }

    /// Apply one live event. Returns `true` if the message was appended,
    /// `false` if it was a duplicate or arrived out of order.
    pub fn apply(&mut self, message: Message) -> bool {
        if self.seen.contains(&message.id) {
            return false;
        }
        if let Some(last) = self.messages.last() {
            if message.created_at < last.created_at {
                return false;
            }
        }
        self.seen.insert(message.id);
        self.messages.push(message);
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One entry in a buyer's "your messages" view: a single conversation
/// per listing, regardless of how many messages were exchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub listing_id: ListingId,
    pub seller_email: String,
    pub title: String,
}

/// Collapse a buyer's messages into one summary per distinct listing.
///
/// First-seen wins within a listing, and input order is preserved across
/// listings. Titles come from `titles`, falling back to
/// [`UNTITLED_LISTING`] for listings that no longer resolve.
pub fn conversation_summaries(
    messages: &[Message],
    titles: &BTreeMap<ListingId, String>,
) -> Vec<ConversationSummary> {
    let mut seen = BTreeSet::new();
    let mut summaries = Vec::new();
    for message in messages {
        if !seen.insert(message.listing_id.clone()) {
            continue;
        }
        let title = titles
            .get(&message.listing_id)
            .cloned()
            .unwrap_or_else(|| UNTITLED_LISTING.to_string());
        summaries.push(ConversationSummary {
            listing_id: message.listing_id.clone(),
            seller_email: message.seller_email.clone(),
            title,
        });
    }
    summaries
}
