use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatcherError>;

#[derive(Error, Debug)]
pub enum WatcherError {
	#[error("failed to create the platform watcher: {0}")]
	Create(#[source] notify::Error),
	#[error("failed to watch <path='{}'>: {source}", .path.display())]
	Watch {
		path: PathBuf,
		#[source]
		source: notify::Error,
	},
	#[error("failed to unwatch <path='{}'>: {source}", .path.display())]
	Unwatch {
		path: PathBuf,
		#[source]
		source: notify::Error,
	},
	#[error("watcher was already stopped")]
	Stopped,
}
