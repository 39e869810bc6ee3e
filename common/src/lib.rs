pub mod category;
pub mod format;
pub mod listing;
pub mod message;
pub mod query;
