use plaza_common::listing::ListingId;
use thiserror::Error;

/// Backend read/write failure. The backend is opaque to this crate, so
/// the error carries the failed operation and the backend's own message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("store operation '{operation}' failed: {message}")]
pub struct StoreError {
    pub operation: String,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Failure sending a chat message.
#[derive(Debug, Error)]
pub enum SendError {
    /// Empty or whitespace-only body, rejected before any store call.
    #[error("message body is empty")]
    EmptyMessage,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure creating a listing.
#[derive(Debug, Error)]
pub enum CreateError {
    /// Bad draft input, rejected before any upload or insert.
    #[error("invalid listing draft: {0}")]
    Validation(String),
    /// Photo rejected before upload (too large or unsupported type).
    #[error("invalid photo: {0}")]
    Photo(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The listing row was written but a dependent step failed. The
    /// listing is not rolled back; the caller must surface this
    /// distinctly.
    #[error("listing {listing_id} was created but a dependent write failed: {source}")]
    PartialFailure {
        listing_id: ListingId,
        source: StoreError,
    },
}
