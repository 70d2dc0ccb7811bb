use fav_utils::FileIOError;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
	#[error("'{}' is already in your favorites", .0.display())]
	Duplicate(PathBuf),
	#[error("invalid index {index}, the store holds {len} favorites")]
	InvalidIndex { index: usize, len: usize },
	#[error("a favorite needs a non-empty path")]
	EmptyPath,
	#[error("favorites store at '{}' can't be parsed: {source}", .path.display())]
	Corrupt {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("failed to serialize favorites: {0}")]
	Serialize(#[from] serde_json::Error),
	#[error(transparent)]
	Write(#[from] FileIOError),
}
