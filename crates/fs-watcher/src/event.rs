use std::{path::PathBuf, time::SystemTime};

use notify::{
	event::{ModifyKind, RenameMode},
	Event, EventKind,
};
use serde::{Deserialize, Serialize};

/// Which half of a rename a raw notification describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenameStage {
	/// Both paths in one event, `paths[0]` is the source and `paths[1]` the destination
	Both,
	/// The path the entry was moved away from
	From,
	/// The path the entry was moved to
	To,
	/// The backend could not tell which half this is (macOS FSEvents)
	Any,
}

/// Raw notification kinds, flattened from `notify::EventKind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventKind {
	Create,
	Remove,
	Modify,
	Rename(RenameStage),
	Other(String),
}

/// A notification as delivered by the OS, before any pairing or buffering
#[derive(Debug, Clone)]
pub struct RawNotifyEvent {
	pub kind: RawEventKind,
	pub paths: Vec<PathBuf>,
	/// Correlates the two halves of a rename when the backend provides it (inotify cookie)
	pub tracker: Option<usize>,
	pub timestamp: SystemTime,
}

impl RawNotifyEvent {
	pub fn primary_path(&self) -> Option<&PathBuf> {
		self.paths.first()
	}
}

impl From<Event> for RawNotifyEvent {
	fn from(event: Event) -> Self {
		let kind = match event.kind {
			EventKind::Create(_) => RawEventKind::Create,
			EventKind::Remove(_) => RawEventKind::Remove,
			EventKind::Modify(ModifyKind::Name(mode)) => RawEventKind::Rename(match mode {
				RenameMode::Both => RenameStage::Both,
				RenameMode::From => RenameStage::From,
				RenameMode::To => RenameStage::To,
				RenameMode::Any | RenameMode::Other => RenameStage::Any,
			}),
			EventKind::Modify(_) => RawEventKind::Modify,
			other => RawEventKind::Other(format!("{other:?}")),
		};

		Self {
			kind,
			tracker: event.attrs.tracker(),
			paths: event.paths,
			timestamp: SystemTime::now(),
		}
	}
}

/// Normalized filesystem event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsEvent {
	pub kind: FsEventKind,
	pub timestamp: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsEventKind {
	Create { path: PathBuf },
	Remove { path: PathBuf },
	Rename { from: PathBuf, to: PathBuf },
}

impl FsEventKind {
	pub fn is_create(&self) -> bool {
		matches!(self, Self::Create { .. })
	}

	pub fn is_remove(&self) -> bool {
		matches!(self, Self::Remove { .. })
	}

	pub fn is_rename(&self) -> bool {
		matches!(self, Self::Rename { .. })
	}
}

impl FsEvent {
	pub fn create(path: PathBuf) -> Self {
		Self::new(FsEventKind::Create { path })
	}

	pub fn remove(path: PathBuf) -> Self {
		Self::new(FsEventKind::Remove { path })
	}

	pub fn rename(from: PathBuf, to: PathBuf) -> Self {
		Self::new(FsEventKind::Rename { from, to })
	}

	fn new(kind: FsEventKind) -> Self {
		Self {
			kind,
			timestamp: SystemTime::now(),
		}
	}
}
