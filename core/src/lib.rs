//! Favorite files that keep up with their targets.
//!
//! A [`FavoritesCore`] owns the persisted list of bookmarked paths. When a bookmarked file is
//! renamed inside its directory the watcher rewrites the bookmark on its own, and when it was
//! moved somewhere else its name can be searched for under a set of root directories.

pub mod api;
pub mod config;
pub mod event;
pub mod existence;
pub mod favorites;
pub mod search;
pub mod watcher;

pub use api::{FailureKind, FavoritesCore, LocateError, Response};
pub use config::FavoritesConfig;
pub use event::{CoreEvent, EventBus, EventSubscriber};
pub use existence::FavoriteStatus;
pub use favorites::{BookmarkRecord, FavoriteStore, LoadOptions, LoadOutcome, StoreError};
pub use search::{
	SearchError, SearchOutcome, SearchProgress, SearchRequest, SearchResult, SearchRoots,
};
pub use watcher::FavoritesWatcher;

pub use fav_fs_watcher::WatcherError;
pub use tokio_util::sync::CancellationToken;
