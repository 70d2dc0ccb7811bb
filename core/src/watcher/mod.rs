//! Keeps favorites pointing at their files while they are renamed or moved.
//!
//! The parent directory of every favorite gets one non-recursive watch. Normalized events from
//! [`FsWatcher`] are consumed one at a time by a single task, and every rename whose source is
//! a favorite is written back to the store before the next event is looked at.

use crate::{
	config::WatcherConfig,
	event::{CoreEvent, EventBus},
	favorites::{BookmarkRecord, FavoriteStore, StoreError},
};

use fav_fs_watcher::{FsEvent, FsEventKind, FsWatcher, FsWatcherConfig, WatcherError};
use fav_utils::normalize_path;

use std::{
	collections::BTreeSet,
	path::{Path, PathBuf},
	sync::Arc,
};

use tokio::{spawn, sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

/// Applies rename events to the store
#[derive(Debug, Clone)]
pub struct RelocationHandler {
	store: Arc<FavoriteStore>,
	events: EventBus,
}

impl RelocationHandler {
	pub fn new(store: Arc<FavoriteStore>, events: EventBus) -> Self {
		Self { store, events }
	}

	/// Returns the index of the relocated favorite, or `None` when the event touched none.
	///
	/// A successful relocation emits exactly one [`CoreEvent::BookmarkRelocated`], a failed one
	/// a [`CoreEvent::RelocationFailed`].
	#[instrument(skip_all, err)]
	pub async fn handle(&self, event: FsEvent) -> Result<Option<usize>, StoreError> {
		let FsEventKind::Rename { from, to } = event.kind else {
			trace!(kind = ?event.kind, "Ignoring non rename event");
			return Ok(None);
		};

		let from = normalize_path(from);
		let to = normalize_path(to);

		match self.store.relocate(&from, &to).await {
			Ok(Some((index, record))) => {
				info!(
					index,
					from = %from.display(),
					to = %record.path().display(),
					"Favorite followed its file"
				);
				self.events.emit(CoreEvent::BookmarkRelocated {
					index,
					from,
					to: record.path().to_path_buf(),
				});
				Ok(Some(index))
			}
			Ok(None) => {
				trace!(from = %from.display(), "Rename touched no favorite");
				Ok(None)
			}
			Err(e) => {
				self.events.emit(CoreEvent::RelocationFailed {
					from,
					to,
					reason: e.to_string(),
				});
				Err(e)
			}
		}
	}
}

/// Directories to watch so that every favorite's renames are seen
pub fn watch_set(records: &[BookmarkRecord]) -> BTreeSet<PathBuf> {
	records
		.iter()
		.filter_map(BookmarkRecord::parent_dir)
		.filter(|dir| !dir.as_os_str().is_empty())
		.collect()
}

/// The running watcher: OS watches, the event pump and the relocation task.
///
/// The watch set is computed once at [`FavoritesWatcher::start`]; favorites added afterwards are
/// only followed after a [`FavoritesWatcher::rewatch`].
#[derive(Debug)]
pub struct FavoritesWatcher {
	fs_watcher: FsWatcher,
	store: Arc<FavoriteStore>,
	events: EventBus,
	cancel: CancellationToken,
	consumer: Option<JoinHandle<()>>,
}

impl FavoritesWatcher {
	#[instrument(skip_all, err)]
	pub async fn start(
		store: Arc<FavoriteStore>,
		events: EventBus,
		config: &WatcherConfig,
	) -> Result<Self, WatcherError> {
		let (mut fs_watcher, fs_events) = FsWatcher::new(FsWatcherConfig {
			tick_interval: config.tick_interval(),
			rename_timeout: config.rename_timeout(),
		})?;

		for dir in watch_set(&store.list().await) {
			register(&mut fs_watcher, &events, &dir);
		}

		let cancel = CancellationToken::new();
		let consumer = spawn(consume(
			RelocationHandler::new(Arc::clone(&store), events.clone()),
			fs_events,
			cancel.clone(),
		));

		info!(
			directories = fs_watcher.watched().count(),
			"Started watching favorites"
		);

		Ok(Self {
			fs_watcher,
			store,
			events,
			cancel,
			consumer: Some(consumer),
		})
	}

	pub fn watched_dirs(&self) -> Vec<PathBuf> {
		self.fs_watcher.watched().map(Path::to_path_buf).collect()
	}

	/// Recomputes the watch set from the current favorites, adding and dropping watches as
	/// needed.
	#[instrument(skip(self))]
	pub async fn rewatch(&mut self) {
		let wanted = watch_set(&self.store.list().await);
		let current = self.watched_dirs().into_iter().collect::<BTreeSet<_>>();

		for stale in current.difference(&wanted) {
			if let Err(e) = self.fs_watcher.unwatch(stale) {
				warn!(?e, "Failed to drop stale watch;");
			}
		}

		for dir in wanted.difference(&current) {
			register(&mut self.fs_watcher, &self.events, dir);
		}

		debug!(
			directories = self.fs_watcher.watched().count(),
			"Recomputed watch set"
		);
	}

	/// Stops the relocation task, then the OS watches and the event pump.
	///
	/// A relocation already underway finishes first; none starts after this returns.
	#[instrument(skip(self))]
	pub async fn stop(mut self) {
		self.cancel.cancel();

		if let Some(consumer) = self.consumer.take() {
			if let Err(e) = consumer.await {
				error!(?e, "Failed to join relocation task;");
			}
		}

		self.fs_watcher.stop().await;
		info!("Stopped watching favorites");
	}
}

impl Drop for FavoritesWatcher {
	fn drop(&mut self) {
		if self.consumer.take().is_some() {
			warn!("Favorites watcher dropped without being stopped");
			self.cancel.cancel();
		}
	}
}

fn register(fs_watcher: &mut FsWatcher, events: &EventBus, dir: &Path) {
	if let Err(e) = fs_watcher.watch(dir) {
		warn!(?e, "Skipping directory that can't be watched;");
		events.emit(CoreEvent::WatchRegistrationFailed {
			directory: dir.to_path_buf(),
			reason: e.to_string(),
		});
	}
}

async fn consume(
	handler: RelocationHandler,
	mut fs_events: mpsc::UnboundedReceiver<FsEvent>,
	cancel: CancellationToken,
) {
	loop {
		tokio::select! {
			biased;

			() = cancel.cancelled() => break,

			event = fs_events.recv() => {
				let Some(event) = event else {
					debug!("File system events closed");
					break;
				};

				// Failures are already reported by the handler
				let _ = handler.handle(event).await;
			}
		}
	}

	debug!("Relocation task finished");
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::favorites::LoadOptions;

	use tempfile::tempdir;
	use tokio::sync::broadcast::error::TryRecvError;

	async fn store_with(dir: &Path, paths: &[&str]) -> Arc<FavoriteStore> {
		let store = FavoriteStore::load(dir.join("favorites.json"), LoadOptions::default()).await;
		for path in paths {
			store.add(path, "").await.unwrap();
		}
		Arc::new(store)
	}

	#[tokio::test]
	async fn rename_of_a_favorite_relocates_it_once() {
		let dir = tempdir().unwrap();
		let store = store_with(dir.path(), &["/data/a.txt", "/data/b.txt"]).await;
		let events = EventBus::default();
		let mut subscriber = events.subscribe();

		let handler = RelocationHandler::new(Arc::clone(&store), events);
		let relocated = handler
			.handle(FsEvent::rename(
				PathBuf::from("/data/./b.txt"),
				PathBuf::from("/data/c.txt"),
			))
			.await
			.unwrap();

		assert_eq!(relocated, Some(1));
		assert_eq!(
			store.get(1).await.unwrap().path(),
			Path::new("/data/c.txt")
		);
		assert_eq!(
			subscriber.try_recv().unwrap(),
			CoreEvent::BookmarkRelocated {
				index: 1,
				from: PathBuf::from("/data/b.txt"),
				to: PathBuf::from("/data/c.txt"),
			}
		);
		assert!(matches!(subscriber.try_recv(), Err(TryRecvError::Empty)));
	}

	#[tokio::test]
	async fn unrelated_events_are_ignored() {
		let dir = tempdir().unwrap();
		let store = store_with(dir.path(), &["/data/a.txt"]).await;
		let events = EventBus::default();
		let mut subscriber = events.subscribe();

		let handler = RelocationHandler::new(Arc::clone(&store), events);
		for event in [
			FsEvent::rename(PathBuf::from("/data/z.txt"), PathBuf::from("/data/y.txt")),
			FsEvent::remove(PathBuf::from("/data/a.txt")),
			FsEvent::create(PathBuf::from("/data/new.txt")),
		] {
			assert_eq!(handler.handle(event).await.unwrap(), None);
		}

		assert_eq!(store.get(0).await.unwrap().path(), Path::new("/data/a.txt"));
		assert!(matches!(subscriber.try_recv(), Err(TryRecvError::Empty)));
	}

	#[test]
	fn watch_set_holds_distinct_parents() {
		let records = [
			BookmarkRecord::new(PathBuf::from("/data/a.txt"), String::new()),
			BookmarkRecord::new(PathBuf::from("/data/b.txt"), String::new()),
			BookmarkRecord::new(PathBuf::from("/srv/c.txt"), String::new()),
		];

		assert_eq!(
			watch_set(&records).into_iter().collect::<Vec<_>>(),
			vec![PathBuf::from("/data"), PathBuf::from("/srv")]
		);
	}
}
