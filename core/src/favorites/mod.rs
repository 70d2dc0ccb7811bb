//! The favorites store: an ordered list of bookmarked file paths persisted as one JSON file.

mod error;
mod record;
mod store;
mod timestamp;

pub use error::StoreError;
pub use record::BookmarkRecord;
pub use store::{FavoriteStore, LoadOptions, LoadOutcome};
