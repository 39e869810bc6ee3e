//! In-memory backend implementing all four store traits.
//!
//! Stands in for the hosted database, blob bucket, and change feed in
//! tests and demos. Fault-injection switches let callers exercise error
//! paths without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

use plaza_common::listing::{Listing, ListingId, VehicleDetails};
use plaza_common::message::Message;
use plaza_common::query::{filter_listings, ListingQuery};

use crate::error::StoreError;
use crate::store::{BlobStore, ListingStore, MessageFeed, MessageStore, VehicleStore};

const PUBLIC_BASE: &str = "memory://listing-images";

#[derive(Default)]
pub struct MemoryBackend {
    listings: DashMap<ListingId, Listing>,
    vehicles: DashMap<ListingId, VehicleDetails>,
    messages: RwLock<Vec<Message>>,
    subscribers: DashMap<ListingId, Vec<mpsc::UnboundedSender<Message>>>,
    blobs: DashMap<String, Vec<u8>>,
    fail_listing_writes: AtomicBool,
    fail_vehicle_writes: AtomicBool,
    fail_message_writes: AtomicBool,
    fail_blob_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every listing insert fail until reset.
    pub fn fail_listing_writes(&self, on: bool) {
        self.fail_listing_writes.store(on, Ordering::SeqCst);
    }

    /// Make every vehicle insert fail until reset.
    pub fn fail_vehicle_writes(&self, on: bool) {
        self.fail_vehicle_writes.store(on, Ordering::SeqCst);
    }

    /// Make every message insert fail until reset.
    pub fn fail_message_writes(&self, on: bool) {
        self.fail_message_writes.store(on, Ordering::SeqCst);
    }

    /// Make every blob upload fail until reset.
    pub fn fail_blob_writes(&self, on: bool) {
        self.fail_blob_writes.store(on, Ordering::SeqCst);
    }

    /// Make every read fail until reset.
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.read().expect("messages lock").len()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    fn check_read(&self, operation: &str) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::new(operation, "injected read failure"));
        }
        Ok(())
    }

    fn publish(&self, message: &Message) {
        if let Some(mut senders) = self.subscribers.get_mut(&message.listing_id) {
            senders.retain(|tx| tx.send(message.clone()).is_ok());
        }
    }
}

#[async_trait]
impl ListingStore for MemoryBackend {
    async fn insert_listing(&self, listing: Listing) -> Result<(), StoreError> {
        if self.fail_listing_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("insert_listing", "injected write failure"));
        }
        tracing::debug!(id = %listing.id, title = %listing.title, "inserting listing");
        self.listings.insert(listing.id.clone(), listing);
        Ok(())
    }

    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        self.check_read("get_listing")?;
        Ok(self.listings.get(id).map(|entry| entry.value().clone()))
    }

    async fn query_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        self.check_read("query_listings")?;
        let snapshot: Vec<Listing> = self.listings.iter().map(|e| e.value().clone()).collect();
        Ok(filter_listings(&snapshot, query))
    }
}

#[async_trait]
impl VehicleStore for MemoryBackend {
    async fn insert_vehicle(&self, vehicle: VehicleDetails) -> Result<(), StoreError> {
        if self.fail_vehicle_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("insert_vehicle", "injected write failure"));
        }
        self.vehicles.insert(vehicle.listing_id.clone(), vehicle);
        Ok(())
    }

    async fn get_vehicle(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<VehicleDetails>, StoreError> {
        self.check_read("get_vehicle")?;
        Ok(self.vehicles.get(listing_id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl MessageStore for MemoryBackend {
    async fn insert_message(&self, message: Message) -> Result<(), StoreError> {
        if self.fail_message_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("insert_message", "injected write failure"));
        }
        self.messages
            .write()
            .expect("messages lock")
            .push(message.clone());
        // The change feed echoes every committed insert, including the
        // sender's own.
        self.publish(&message);
        Ok(())
    }

    async fn messages_for_listing(&self, id: &ListingId) -> Result<Vec<Message>, StoreError> {
        self.check_read("messages_for_listing")?;
        let mut history: Vec<Message> = self
            .messages
            .read()
            .expect("messages lock")
            .iter()
            .filter(|m| m.listing_id == *id)
            .cloned()
            .collect();
        history.sort_by_key(|m| m.created_at);
        Ok(history)
    }

    async fn messages_from_buyer(&self, buyer_email: &str) -> Result<Vec<Message>, StoreError> {
        self.check_read("messages_from_buyer")?;
        Ok(self
            .messages
            .read()
            .expect("messages lock")
            .iter()
            .filter(|m| m.buyer_email == buyer_email)
            .cloned()
            .collect())
    }

    fn subscribe(&self, listing_id: &ListingId) -> MessageFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .entry(listing_id.clone())
            .or_default()
            .push(tx);
        MessageFeed::new(rx)
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if self.fail_blob_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("upload", "injected write failure"));
        }
        self.blobs.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn list_folder(&self, folder: &str) -> Result<Vec<String>, StoreError> {
        self.check_read("list_folder")?;
        let prefix = format!("{folder}/");
        let mut names: Vec<String> = self
            .blobs
            .iter()
            .filter_map(|entry| {
                let rest = entry.key().strip_prefix(&prefix)?;
                // Direct children only.
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{PUBLIC_BASE}/{path}")
    }
}
