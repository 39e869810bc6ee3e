//! The marketplace client: a user-scoped façade over the backend
//! stores. The current user's email is explicit state here, never a
//! global.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use plaza_common::listing::{Listing, ListingId, VehicleDetails};
use plaza_common::message::{conversation_summaries, ConversationSummary, Message, MessageId};
use plaza_common::query::ListingQuery;

use crate::create::{self, ListingDraft, Photo, VehicleDraft};
use crate::error::{CreateError, SendError, StoreError};
use crate::memory::MemoryBackend;
use crate::store::{BlobStore, ListingStore, MessageStore, VehicleStore};
use crate::sync::ConversationHandle;

/// Everything the listing detail page needs: the listing, its vehicle
/// details when applicable, and resolved photo URLs.
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: Listing,
    pub vehicle: Option<VehicleDetails>,
    pub photo_urls: Vec<String>,
}

/// Compact listing metadata for chat headers and previews.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSummary {
    pub listing_id: ListingId,
    pub title: String,
    pub price_cents: u64,
    pub location: String,
    pub first_photo_url: Option<String>,
}

pub struct MarketClient {
    listings: Arc<dyn ListingStore>,
    vehicles: Arc<dyn VehicleStore>,
    messages: Arc<dyn MessageStore>,
    blobs: Arc<dyn BlobStore>,
    user_email: String,
}

impl MarketClient {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        vehicles: Arc<dyn VehicleStore>,
        messages: Arc<dyn MessageStore>,
        blobs: Arc<dyn BlobStore>,
        user_email: impl Into<String>,
    ) -> Self {
        Self {
            listings,
            vehicles,
            messages,
            blobs,
            user_email: user_email.into(),
        }
    }

    /// Client over a single [`MemoryBackend`] playing all four store
    /// roles.
    pub fn with_backend(backend: Arc<MemoryBackend>, user_email: impl Into<String>) -> Self {
        Self::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            user_email,
        )
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    /// Listings matching `query`, newest first. A store failure is the
    /// caller's cue for an empty-with-error state.
    pub async fn browse(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        self.listings.query_listings(query).await
    }

    /// Full detail for one listing, or `None` for the not-found view.
    /// Vehicle details and photos are enrichments: if they fail to load
    /// the detail still renders, with the failure logged.
    pub async fn listing_detail(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetail>, StoreError> {
        let Some(listing) = self.listings.get_listing(id).await? else {
            return Ok(None);
        };

        let vehicle = if listing.category.eq_ignore_ascii_case("vehicles") {
            match self.vehicles.get_vehicle(id).await {
                Ok(vehicle) => vehicle,
                Err(e) => {
                    tracing::warn!(listing = %id, error = %e, "vehicle details unavailable");
                    None
                }
            }
        } else {
            None
        };

        let photo_urls = match &listing.image_folder {
            Some(folder) => self.photo_urls(folder).await.unwrap_or_else(|e| {
                tracing::warn!(listing = %id, error = %e, "photo listing unavailable");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(Some(ListingDetail {
            listing,
            vehicle,
            photo_urls,
        }))
    }

    /// Chat-header metadata, resolved from the listing itself rather
    /// than from whatever a message happened to carry.
    pub async fn listing_summary(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingSummary>, StoreError> {
        let Some(listing) = self.listings.get_listing(id).await? else {
            return Ok(None);
        };

        let first_photo_url = match &listing.image_folder {
            Some(folder) => self
                .blobs
                .list_folder(folder)
                .await?
                .first()
                .map(|name| self.blobs.public_url(&format!("{folder}/{name}"))),
            None => None,
        };

        Ok(Some(ListingSummary {
            listing_id: listing.id,
            title: listing.title,
            price_cents: listing.price_cents,
            location: listing.location,
            first_photo_url,
        }))
    }

    /// Public URLs for every photo in a listing's folder, name order.
    pub async fn photo_urls(&self, folder: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .blobs
            .list_folder(folder)
            .await?
            .into_iter()
            .map(|name| self.blobs.public_url(&format!("{folder}/{name}")))
            .collect())
    }

    /// The current user's conversations: one entry per listing they
    /// have messaged about, titles resolved through the listing store.
    pub async fn conversations(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let messages = self.messages.messages_from_buyer(&self.user_email).await?;

        let mut titles = BTreeMap::new();
        for message in &messages {
            if titles.contains_key(&message.listing_id) {
                continue;
            }
            if let Some(listing) = self.listings.get_listing(&message.listing_id).await? {
                titles.insert(message.listing_id.clone(), listing.title);
            }
        }

        Ok(conversation_summaries(&messages, &titles))
    }

    /// Open a live conversation view for one listing. See
    /// [`ConversationHandle`] for the event contract.
    pub fn open_conversation(&self, listing_id: &ListingId) -> ConversationHandle {
        ConversationHandle::open(self.messages.clone(), listing_id.clone())
    }

    /// Send a chat message as the current user. The live feed echoes
    /// the committed row back; there is no optimistic local append.
    pub async fn send_message(
        &self,
        listing_id: &ListingId,
        seller_email: &str,
        body: &str,
    ) -> Result<MessageId, SendError> {
        if body.trim().is_empty() {
            return Err(SendError::EmptyMessage);
        }

        let message = Message {
            id: rand::thread_rng().gen(),
            listing_id: listing_id.clone(),
            buyer_email: self.user_email.clone(),
            seller_email: seller_email.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        let id = message.id;
        self.messages.insert_message(message).await?;
        Ok(id)
    }

    /// Create an item listing from a draft plus photos.
    pub async fn create_listing(
        &self,
        draft: &ListingDraft,
        photos: &[Photo],
    ) -> Result<ListingId, CreateError> {
        create::create_listing(&*self.listings, &*self.blobs, draft, photos).await
    }

    /// Create a vehicle listing (category forced to "Vehicles").
    pub async fn create_vehicle_listing(
        &self,
        draft: &ListingDraft,
        vehicle: &VehicleDraft,
        photos: &[Photo],
    ) -> Result<ListingId, CreateError> {
        create::create_vehicle_listing(
            &*self.listings,
            &*self.vehicles,
            &*self.blobs,
            draft,
            vehicle,
            photos,
        )
        .await
    }
}
