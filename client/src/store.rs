//! Interfaces to the hosted backend: row stores, blob storage, and the
//! per-listing message change feed. The client core only ever talks to
//! these traits; [`crate::memory::MemoryBackend`] implements them for
//! tests and demos.

use async_trait::async_trait;
use tokio::sync::mpsc;

use plaza_common::listing::{Listing, ListingId, VehicleDetails};
use plaza_common::message::Message;
use plaza_common::query::ListingQuery;

use crate::error::StoreError;

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_listing(&self, listing: Listing) -> Result<(), StoreError>;

    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;

    /// Listings matching `query`, newest first.
    async fn query_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn insert_vehicle(&self, vehicle: VehicleDetails) -> Result<(), StoreError>;

    async fn get_vehicle(&self, listing_id: &ListingId)
        -> Result<Option<VehicleDetails>, StoreError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: Message) -> Result<(), StoreError>;

    /// Full history for one listing, ordered by creation time ascending
    /// (ties in insertion order).
    async fn messages_for_listing(&self, id: &ListingId) -> Result<Vec<Message>, StoreError>;

    /// Every message a buyer has sent, in insertion order.
    async fn messages_from_buyer(&self, buyer_email: &str) -> Result<Vec<Message>, StoreError>;

    /// Open a live feed of messages inserted for `listing_id` from this
    /// point on. Dropping the feed tears the subscription down.
    fn subscribe(&self, listing_id: &ListingId) -> MessageFeed;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// File names directly under `folder`, sorted ascending.
    async fn list_folder(&self, folder: &str) -> Result<Vec<String>, StoreError>;

    fn public_url(&self, path: &str) -> String;
}

/// Pull-based feed of newly inserted messages for a single listing.
///
/// Events published while the consumer is busy (for example, during the
/// initial history load) queue in the channel rather than being dropped.
pub struct MessageFeed {
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl MessageFeed {
    pub fn new(receiver: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { receiver }
    }

    /// Next message, or `None` once the publishing side has gone away.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }
}
