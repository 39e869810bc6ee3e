pub mod client;
pub mod create;
pub mod error;
pub mod memory;
pub mod store;
pub mod sync;

pub use client::{ListingDetail, ListingSummary, MarketClient};
pub use create::{ListingDraft, Photo, VehicleDraft};
pub use error::{CreateError, SendError, StoreError};
pub use memory::MemoryBackend;
pub use sync::{ConversationEvent, ConversationHandle};
