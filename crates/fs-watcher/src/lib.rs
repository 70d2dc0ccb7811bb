//! Filesystem watcher used to follow bookmarked files across renames.
//!
//! Wraps `notify` with non-recursive directory watches and turns its raw, platform-specific
//! notifications into [`FsEvent`]s. Rename notifications arrive split in two halves on most
//! platforms; the [`platform`] handlers pair them back into a single [`FsEventKind::Rename`].

mod error;
mod event;
pub mod platform;
mod watcher;

pub use error::{Result, WatcherError};
pub use event::{FsEvent, FsEventKind, RawEventKind, RawNotifyEvent, RenameStage};
pub use watcher::{FsWatcher, FsWatcherConfig};
