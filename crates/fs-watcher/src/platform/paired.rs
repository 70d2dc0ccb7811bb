//! Rename pairing for backends that report the two halves of a rename separately.
//!
//! Windows emits a "from" event followed by a "to" event. macOS FSEvents emits two events of
//! unknown direction; the half whose path no longer exists is the source. Halves are matched
//! by tracker when the backend provides one and by arrival order otherwise. A half left alone
//! longer than the rename timeout is flushed as a removal (source) or a creation (destination).

use crate::event::{RawEventKind, RawNotifyEvent, RenameStage};
use crate::platform::EventHandler;
use crate::{FsEvent, Result};

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::{fs, sync::RwLock};
use tracing::trace;

#[derive(Debug)]
struct Half {
	path: PathBuf,
	tracker: Option<usize>,
	since: Instant,
}

#[derive(Debug, Default)]
struct PendingRenames {
	from: VecDeque<Half>,
	to: VecDeque<Half>,
}

fn take_match(queue: &mut VecDeque<Half>, tracker: Option<usize>) -> Option<Half> {
	let position = match tracker {
		Some(_) => queue.iter().position(|half| half.tracker == tracker),
		None => queue.iter().position(|half| half.tracker.is_none()),
	}?;
	queue.remove(position)
}

#[derive(Debug)]
pub struct PairedRenameHandler {
	rename_timeout: Duration,
	pending: RwLock<PendingRenames>,
}

impl PairedRenameHandler {
	pub fn new(rename_timeout: Duration) -> Self {
		Self {
			rename_timeout,
			pending: RwLock::new(PendingRenames::default()),
		}
	}

	async fn pair(&self, stage: RenameStage, path: PathBuf, tracker: Option<usize>) -> Vec<FsEvent> {
		let mut pending = self.pending.write().await;
		let half = Half {
			path,
			tracker,
			since: Instant::now(),
		};

		match stage {
			RenameStage::From => match take_match(&mut pending.to, tracker) {
				Some(to) => vec![FsEvent::rename(half.path, to.path)],
				None => {
					pending.from.push_back(half);
					vec![]
				}
			},
			_ => match take_match(&mut pending.from, tracker) {
				Some(from) => vec![FsEvent::rename(from.path, half.path)],
				None => {
					pending.to.push_back(half);
					vec![]
				}
			},
		}
	}
}

#[async_trait::async_trait]
impl EventHandler for PairedRenameHandler {
	async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>> {
		let Some(path) = event.primary_path().cloned() else {
			return Ok(vec![]);
		};

		match event.kind {
			RawEventKind::Create => Ok(vec![FsEvent::create(path)]),
			RawEventKind::Remove => Ok(vec![FsEvent::remove(path)]),
			RawEventKind::Modify => Ok(vec![]),
			RawEventKind::Rename(RenameStage::Both) if event.paths.len() >= 2 => Ok(vec![
				FsEvent::rename(event.paths[0].clone(), event.paths[1].clone()),
			]),
			RawEventKind::Rename(RenameStage::Any) => {
				let stage = if fs::try_exists(&path).await.unwrap_or(false) {
					RenameStage::To
				} else {
					RenameStage::From
				};
				Ok(self.pair(stage, path, event.tracker).await)
			}
			RawEventKind::Rename(stage) => Ok(self.pair(stage, path, event.tracker).await),
			RawEventKind::Other(ref kind) => {
				trace!("Ignoring unknown event kind: {}", kind);
				Ok(vec![])
			}
		}
	}

	async fn tick(&self) -> Result<Vec<FsEvent>> {
		let mut pending = self.pending.write().await;
		let mut events = Vec::new();

		while pending
			.from
			.front()
			.is_some_and(|half| half.since.elapsed() > self.rename_timeout)
		{
			if let Some(half) = pending.from.pop_front() {
				trace!("Evicting unmatched rename source: {}", half.path.display());
				events.push(FsEvent::remove(half.path));
			}
		}

		while pending
			.to
			.front()
			.is_some_and(|half| half.since.elapsed() > self.rename_timeout)
		{
			if let Some(half) = pending.to.pop_front() {
				trace!("Evicting unmatched rename target: {}", half.path.display());
				events.push(FsEvent::create(half.path));
			}
		}

		Ok(events)
	}

	async fn reset(&self) {
		let mut pending = self.pending.write().await;
		pending.from.clear();
		pending.to.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::FsEventKind;

	use std::time::SystemTime;

	fn half(stage: RenameStage, path: impl Into<PathBuf>, tracker: Option<usize>) -> RawNotifyEvent {
		RawNotifyEvent {
			kind: RawEventKind::Rename(stage),
			paths: vec![path.into()],
			tracker,
			timestamp: SystemTime::now(),
		}
	}

	#[tokio::test]
	async fn pairs_from_then_to_in_arrival_order() {
		let handler = PairedRenameHandler::new(Duration::from_millis(100));

		let first = handler
			.process(half(RenameStage::From, "/docs/a.txt", None))
			.await
			.unwrap();
		assert!(first.is_empty());

		let second = handler
			.process(half(RenameStage::To, "/docs/b.txt", None))
			.await
			.unwrap();
		assert_eq!(
			second[0].kind,
			FsEventKind::Rename {
				from: PathBuf::from("/docs/a.txt"),
				to: PathBuf::from("/docs/b.txt"),
			}
		);
	}

	#[tokio::test]
	async fn pairs_by_tracker_when_interleaved() {
		let handler = PairedRenameHandler::new(Duration::from_millis(100));

		handler
			.process(half(RenameStage::From, "/docs/one.txt", Some(1)))
			.await
			.unwrap();
		handler
			.process(half(RenameStage::From, "/docs/two.txt", Some(2)))
			.await
			.unwrap();

		let events = handler
			.process(half(RenameStage::To, "/docs/two-renamed.txt", Some(2)))
			.await
			.unwrap();

		assert_eq!(
			events[0].kind,
			FsEventKind::Rename {
				from: PathBuf::from("/docs/two.txt"),
				to: PathBuf::from("/docs/two-renamed.txt"),
			}
		);
	}

	#[tokio::test]
	async fn undirected_halves_are_resolved_by_existence() {
		let dir = tempfile::tempdir().unwrap();
		let gone = dir.path().join("gone.txt");
		let here = dir.path().join("here.txt");
		std::fs::write(&here, b"x").unwrap();

		let handler = PairedRenameHandler::new(Duration::from_millis(100));

		// Destination first, as FSEvents may deliver them in either order
		assert!(handler
			.process(half(RenameStage::Any, &here, None))
			.await
			.unwrap()
			.is_empty());

		let events = handler
			.process(half(RenameStage::Any, &gone, None))
			.await
			.unwrap();

		assert_eq!(
			events[0].kind,
			FsEventKind::Rename {
				from: gone,
				to: here,
			}
		);
	}

	#[tokio::test]
	async fn stale_halves_are_flushed_on_tick() {
		let handler = PairedRenameHandler::new(Duration::from_millis(10));

		handler
			.process(half(RenameStage::From, "/docs/left.txt", None))
			.await
			.unwrap();

		tokio::time::sleep(Duration::from_millis(30)).await;

		let events = handler.tick().await.unwrap();
		assert_eq!(events.len(), 1);
		assert!(events[0].kind.is_remove());
		assert!(handler.tick().await.unwrap().is_empty());
	}
}
