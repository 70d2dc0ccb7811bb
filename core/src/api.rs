//! The operations a UI shell calls.
//!
//! Store mutations never fail with an error value here: they answer with a [`Response`] carrying
//! the message to show the user, plus a [`FailureKind`] for callers that branch on the cause.

use crate::{
	config::FavoritesConfig,
	event::{EventBus, EventSubscriber},
	existence::{self, FavoriteStatus},
	favorites::{BookmarkRecord, FavoriteStore, LoadOptions, LoadOutcome, StoreError},
	search::{self, SearchError, SearchProgress, SearchRequest, SearchResult, SearchRoots},
	watcher::FavoritesWatcher,
};

use fav_fs_watcher::WatcherError;
use fav_utils::report_error;

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	Duplicate,
	InvalidIndex,
	EmptyPath,
	Storage,
}

impl From<&StoreError> for FailureKind {
	fn from(e: &StoreError) -> Self {
		match e {
			StoreError::Duplicate(_) => Self::Duplicate,
			StoreError::InvalidIndex { .. } => Self::InvalidIndex,
			StoreError::EmptyPath => Self::EmptyPath,
			StoreError::Corrupt { .. } | StoreError::Serialize(_) | StoreError::Write(_) => {
				Self::Storage
			}
		}
	}
}

/// Outcome of a store mutation, ready to be shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
	pub success: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failure: Option<FailureKind>,
}

impl Response {
	pub fn ok(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: message.into(),
			failure: None,
		}
	}

	pub fn failed(e: &StoreError) -> Self {
		let message = match e {
			StoreError::Duplicate(path) => {
				format!("'{}' is already in your favorites.", path.display())
			}
			StoreError::InvalidIndex { .. } => "Invalid index.".to_string(),
			StoreError::EmptyPath => "A favorite needs a path.".to_string(),
			other => format!("Failed to save favorites: {other}"),
		};

		Self {
			success: false,
			message,
			failure: Some(e.into()),
		}
	}
}

#[derive(Error, Debug)]
pub enum LocateError {
	#[error("invalid index {index}, the store holds {len} favorites")]
	InvalidIndex { index: usize, len: usize },
	#[error("'{}' has no file name to search for", .0.display())]
	NoFileName(PathBuf),
	#[error(transparent)]
	Search(#[from] SearchError),
}

/// Owns the store, the event bus and the watcher of one favorites session
#[derive(Debug)]
pub struct FavoritesCore {
	config: FavoritesConfig,
	store: Arc<FavoriteStore>,
	events: EventBus,
	search_roots: SearchRoots,
	watcher: Mutex<Option<FavoritesWatcher>>,
}

impl FavoritesCore {
	/// Loads the store named by `config`. A missing or corrupt store yields an empty list,
	/// see [`FavoritesCore::load_outcome`].
	#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
	pub async fn new(config: FavoritesConfig) -> Self {
		let store = FavoriteStore::load(
			config.store_path(),
			LoadOptions {
				backup_corrupt: config.backup_corrupt_store,
			},
		)
		.await;

		Self {
			search_roots: SearchRoots::from_config(&config.search),
			config,
			store: Arc::new(store),
			events: EventBus::default(),
			watcher: Mutex::new(None),
		}
	}

	/// Replaces the roots used by [`FavoritesCore::search_for_moved_file`]
	pub fn with_search_roots(mut self, roots: SearchRoots) -> Self {
		self.search_roots = roots;
		self
	}

	pub fn config(&self) -> &FavoritesConfig {
		&self.config
	}

	pub fn search_roots(&self) -> &SearchRoots {
		&self.search_roots
	}

	pub fn load_outcome(&self) -> &LoadOutcome {
		self.store.load_outcome()
	}

	pub fn subscribe(&self) -> EventSubscriber {
		self.events.subscribe()
	}

	pub async fn list_favorites(&self) -> Vec<BookmarkRecord> {
		self.store.list().await
	}

	pub async fn list_with_status(&self) -> Vec<FavoriteStatus> {
		existence::check_all(self.store.list().await)
	}

	pub async fn add_favorite(&self, path: impl AsRef<Path>, description: &str) -> Response {
		match self.store.add(path, description).await {
			Ok((_, record)) => {
				Response::ok(format!("Added '{}' to favorites.", record.path().display()))
			}
			Err(e) => Response::failed(&e),
		}
	}

	pub async fn remove_favorite(&self, index: usize) -> Response {
		match self.store.remove(index).await {
			Ok(record) => Response::ok(format!(
				"Removed '{}' from favorites.",
				record.path().display()
			)),
			Err(e) => Response::failed(&e),
		}
	}

	pub async fn update_favorite_path(&self, index: usize, new_path: impl AsRef<Path>) -> Response {
		match self.store.update_path(index, new_path).await {
			Ok(record) => Response::ok(format!(
				"Updated favorite {index} to '{}'.",
				record.path().display()
			)),
			Err(e) => Response::failed(&e),
		}
	}

	pub fn check_exists(&self, record: &BookmarkRecord) -> bool {
		existence::exists(record)
	}

	/// Looks for `filename` under the configured roots
	pub async fn search_for_moved_file(
		&self,
		filename: &str,
		cancel: CancellationToken,
		progress: impl FnMut(SearchProgress) + Send + 'static,
	) -> Result<SearchResult, SearchError> {
		let request = SearchRequest::new(filename, self.search_roots.as_slice().to_vec())
			.with_max_depth(self.config.search.max_depth);

		search::search(request, cancel, progress).await
	}

	/// Searches for the file name of the favorite at `index`
	#[instrument(skip(self, cancel, progress), err)]
	pub async fn locate_favorite(
		&self,
		index: usize,
		cancel: CancellationToken,
		progress: impl FnMut(SearchProgress) + Send + 'static,
	) -> Result<SearchResult, LocateError> {
		let record = self
			.store
			.get(index)
			.await
			.ok_or(LocateError::InvalidIndex {
				index,
				len: self.store.len().await,
			})?;

		let filename = record
			.file_name()
			.ok_or_else(|| LocateError::NoFileName(record.path().to_path_buf()))?;

		Ok(self
			.search_for_moved_file(&filename, cancel, progress)
			.await?)
	}

	/// Starts following favorites across renames. Does nothing if already watching.
	pub async fn start_watching(&self) -> Result<(), WatcherError> {
		let mut watcher = self.watcher.lock().await;
		if watcher.is_some() {
			debug!("Already watching favorites");
			return Ok(());
		}

		*watcher = Some(
			FavoritesWatcher::start(
				Arc::clone(&self.store),
				self.events.clone(),
				&self.config.watcher,
			)
			.await?,
		);

		Ok(())
	}

	/// Stops the watcher started by [`FavoritesCore::start_watching`], if any
	pub async fn stop_watching(&self) {
		if let Some(watcher) = self.watcher.lock().await.take() {
			watcher.stop().await;
		}
	}

	pub async fn is_watching(&self) -> bool {
		self.watcher.lock().await.is_some()
	}

	/// Directories currently watched, empty when not watching
	pub async fn watched_dirs(&self) -> Vec<PathBuf> {
		self.watcher
			.lock()
			.await
			.as_ref()
			.map(FavoritesWatcher::watched_dirs)
			.unwrap_or_default()
	}

	/// Brings the watch set in line with the current favorites. Returns `false` when not
	/// watching.
	pub async fn rewatch(&self) -> bool {
		match self.watcher.lock().await.as_mut() {
			Some(watcher) => {
				watcher.rewatch().await;
				true
			}
			None => false,
		}
	}

	/// Stops the watcher and writes the list out one last time
	pub async fn shutdown(&self) {
		self.stop_watching().await;

		let saved = self.store.save().await;
		report_error(&saved);
		if saved.is_ok() {
			info!("Favorites saved");
		}
	}
}
