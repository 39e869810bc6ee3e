//! Listing creation: validate a draft, upload photos, then write the
//! listing row (and, for vehicles, the dependent details row).

use chrono::Utc;
use rand::Rng;

use plaza_common::category::is_known_category;
use plaza_common::listing::{
    parse_price, Listing, ListingId, VehicleDetails, DEFAULT_LOCATION,
};

use crate::error::CreateError;
use crate::store::{BlobStore, ListingStore, VehicleStore};

/// Largest accepted photo, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// User-entered listing form fields, unvalidated. Price is kept as the
/// raw input string until validation.
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub title: String,
    pub category: String,
    pub price: String,
    pub location: String,
    pub seller_email: String,
    pub description: String,
}

/// Vehicle form fields accompanying a vehicle-flow draft.
#[derive(Debug, Clone, Default)]
pub struct VehicleDraft {
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    pub mileage: Option<u32>,
}

/// A photo file selected for upload.
#[derive(Debug, Clone)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Validated draft, ready to persist.
struct ValidDraft {
    title: String,
    category: String,
    price_cents: u64,
    location: String,
    seller_email: String,
    description: String,
}

/// Create an item listing: photos first, then the listing row. Returns
/// the new listing id.
pub async fn create_listing<L, B>(
    listings: &L,
    blobs: &B,
    draft: &ListingDraft,
    photos: &[Photo],
) -> Result<ListingId, CreateError>
where
    L: ListingStore + ?Sized,
    B: BlobStore + ?Sized,
{
    let valid = validate_draft(draft, true)?;
    validate_photos(photos)?;
    insert_with_photos(listings, blobs, valid, photos).await
}

/// Create a vehicle listing. The category is forced to "Vehicles" and a
/// [`VehicleDetails`] row is written after the listing row; if that
/// second write fails the listing stays (surfaced as
/// [`CreateError::PartialFailure`], never rolled back).
pub async fn create_vehicle_listing<L, V, B>(
    listings: &L,
    vehicles: &V,
    blobs: &B,
    draft: &ListingDraft,
    vehicle: &VehicleDraft,
    photos: &[Photo],
) -> Result<ListingId, CreateError>
where
    L: ListingStore + ?Sized,
    V: VehicleStore + ?Sized,
    B: BlobStore + ?Sized,
{
    let mut valid = validate_draft(draft, false)?;
    valid.category = "Vehicles".to_string();
    validate_photos(photos)?;

    let listing_id = insert_with_photos(listings, blobs, valid, photos).await?;

    let details = VehicleDetails {
        listing_id: listing_id.clone(),
        year: vehicle.year,
        make: vehicle.make.trim().to_string(),
        model: vehicle.model.trim().to_string(),
        mileage: vehicle.mileage,
    };
    if let Err(source) = vehicles.insert_vehicle(details).await {
        tracing::warn!(listing = %listing_id, error = %source, "vehicle details write failed");
        return Err(CreateError::PartialFailure { listing_id, source });
    }

    Ok(listing_id)
}

async fn insert_with_photos<L, B>(
    listings: &L,
    blobs: &B,
    draft: ValidDraft,
    photos: &[Photo],
) -> Result<ListingId, CreateError>
where
    L: ListingStore + ?Sized,
    B: BlobStore + ?Sized,
{
    // Every upload must land before the listing row exists; a failed
    // insert after uploads leaves orphaned photos behind on purpose.
    let image_folder = if photos.is_empty() {
        None
    } else {
        let folder = photo_folder(&draft.title);
        for photo in photos {
            let path = format!("{folder}/{}", photo.file_name);
            blobs.upload(&path, photo.bytes.clone()).await?;
        }
        tracing::debug!(folder = %folder, count = photos.len(), "photos uploaded");
        Some(folder)
    };

    let listing = Listing {
        id: new_listing_id(),
        title: draft.title,
        price_cents: draft.price_cents,
        category: draft.category,
        location: draft.location,
        description: draft.description,
        seller_email: draft.seller_email,
        image_folder,
        created_at: Utc::now(),
    };
    let id = listing.id.clone();
    listings.insert_listing(listing).await?;
    tracing::debug!(listing = %id, "listing created");
    Ok(id)
}

fn validate_draft(draft: &ListingDraft, category_required: bool) -> Result<ValidDraft, CreateError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(CreateError::Validation("title is required".into()));
    }

    let category = draft.category.trim();
    if category_required {
        if category.is_empty() {
            return Err(CreateError::Validation("category is required".into()));
        }
        if !is_known_category(category) {
            return Err(CreateError::Validation(format!(
                "unknown category '{category}'"
            )));
        }
    }

    let price_cents = parse_price(&draft.price).ok_or_else(|| {
        CreateError::Validation(format!("price '{}' is not a valid amount", draft.price))
    })?;

    let seller_email = draft.seller_email.trim();
    if seller_email.is_empty() {
        return Err(CreateError::Validation("contact email is required".into()));
    }

    let location = draft.location.trim();
    let location = if location.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        location.to_string()
    };

    Ok(ValidDraft {
        title: title.to_string(),
        category: category.to_string(),
        price_cents,
        location,
        seller_email: seller_email.to_string(),
        description: draft.description.trim().to_string(),
    })
}

fn validate_photos(photos: &[Photo]) -> Result<(), CreateError> {
    for photo in photos {
        if photo.bytes.len() > MAX_PHOTO_BYTES {
            return Err(CreateError::Photo(format!(
                "{} exceeds the 5MB limit",
                photo.file_name
            )));
        }
        if !ACCEPTED_PHOTO_TYPES.contains(&photo.content_type.as_str()) {
            return Err(CreateError::Photo(format!(
                "{} has unsupported type {}",
                photo.file_name, photo.content_type
            )));
        }
    }
    Ok(())
}

/// Folder path for a listing's photos: upload time plus the title with
/// whitespace runs replaced by hyphens.
fn photo_folder(title: &str) -> String {
    let flat: Vec<&str> = title.split_whitespace().collect();
    format!("{}-{}", Utc::now().timestamp_millis(), flat.join("-"))
}

fn new_listing_id() -> ListingId {
    let suffix: u32 = rand::thread_rng().gen();
    ListingId(format!("l-{}-{suffix:08x}", Utc::now().timestamp_millis()))
}
