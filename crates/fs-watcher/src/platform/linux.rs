//! Linux-specific event handler
//!
//! inotify reports a rename inside watched directories as a "moved from" event, a "moved to"
//! event and finally one combined event carrying both paths, all sharing a cookie. Only the
//! combined event is turned into a rename. A "moved from" that never gets its combined event
//! left the watched directories, so after a timeout it is reported as a removal.

use crate::event::{RawEventKind, RawNotifyEvent, RenameStage};
use crate::platform::EventHandler;
use crate::{FsEvent, Result};

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::trace;

#[derive(Debug)]
struct PendingFrom {
	tracker: Option<usize>,
	since: Instant,
}

/// Linux event handler
#[derive(Debug)]
pub struct LinuxHandler {
	rename_timeout: Duration,
	/// Sources of renames still waiting for their combined event
	pending_from: RwLock<HashMap<PathBuf, PendingFrom>>,
}

impl LinuxHandler {
	pub fn new(rename_timeout: Duration) -> Self {
		Self {
			rename_timeout,
			pending_from: RwLock::new(HashMap::new()),
		}
	}

	async fn is_pending_tracker(&self, tracker: Option<usize>) -> bool {
		tracker.is_some()
			&& self
				.pending_from
				.read()
				.await
				.values()
				.any(|pending| pending.tracker == tracker)
	}

	/// Evict rename sources that waited longer than the timeout
	async fn evict_pending(&self) -> Vec<FsEvent> {
		let mut pending = self.pending_from.write().await;
		let mut events = Vec::new();

		pending.retain(|path, entry| {
			if entry.since.elapsed() > self.rename_timeout {
				trace!("Evicting unmatched rename source: {}", path.display());
				events.push(FsEvent::remove(path.clone()));
				false
			} else {
				true
			}
		});

		events
	}
}

#[async_trait::async_trait]
impl EventHandler for LinuxHandler {
	async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>> {
		let Some(path) = event.primary_path().cloned() else {
			return Ok(vec![]);
		};

		match event.kind {
			RawEventKind::Create => Ok(vec![FsEvent::create(path)]),
			RawEventKind::Remove => Ok(vec![FsEvent::remove(path)]),
			RawEventKind::Modify => Ok(vec![]),
			RawEventKind::Rename(RenameStage::Both) if event.paths.len() >= 2 => {
				let from = event.paths[0].clone();
				let to = event.paths[1].clone();
				self.pending_from.write().await.remove(&from);
				Ok(vec![FsEvent::rename(from, to)])
			}
			RawEventKind::Rename(RenameStage::From) => {
				self.pending_from.write().await.insert(
					path,
					PendingFrom {
						tracker: event.tracker,
						since: Instant::now(),
					},
				);
				Ok(vec![])
			}
			RawEventKind::Rename(RenameStage::To) => {
				if self.is_pending_tracker(event.tracker).await {
					// The combined event follows right after
					Ok(vec![])
				} else {
					// Moved in from somewhere we don't watch
					Ok(vec![FsEvent::create(path)])
				}
			}
			RawEventKind::Rename(stage) => {
				trace!(?stage, "Ignoring incomplete rename: {}", path.display());
				Ok(vec![])
			}
			RawEventKind::Other(ref kind) => {
				trace!("Ignoring unknown event kind: {}", kind);
				Ok(vec![])
			}
		}
	}

	async fn tick(&self) -> Result<Vec<FsEvent>> {
		Ok(self.evict_pending().await)
	}

	async fn reset(&self) {
		self.pending_from.write().await.clear();
	}
}
