//! Liveness checks for favorites.
//!
//! Nothing is cached: every call asks the filesystem again, so the answer is a snapshot that may
//! already be stale by the time the caller acts on it.

use crate::favorites::BookmarkRecord;

use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tracing::trace;

/// A favorite annotated with whether its path currently resolves
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteStatus {
	pub index: usize,
	pub record: BookmarkRecord,
	pub exists: bool,
}

/// Whether the record's path currently resolves
pub fn exists(record: &BookmarkRecord) -> bool {
	path_exists(record.path())
}

/// Errors such as a permission denied on a parent directory count as "does not exist"
pub fn path_exists(path: &Path) -> bool {
	path.try_exists().unwrap_or_else(|e| {
		trace!(?e, path = %path.display(), "Failed to check path existence;");
		false
	})
}

pub async fn exists_async(record: &BookmarkRecord) -> bool {
	fs::try_exists(record.path()).await.unwrap_or_else(|e| {
		trace!(?e, path = %record.path().display(), "Failed to check path existence;");
		false
	})
}

/// Annotates every record with its liveness, keeping the display order
pub fn check_all(records: impl IntoIterator<Item = BookmarkRecord>) -> Vec<FavoriteStatus> {
	records
		.into_iter()
		.enumerate()
		.map(|(index, record)| FavoriteStatus {
			index,
			exists: exists(&record),
			record,
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::favorites::{FavoriteStore, LoadOptions};

	use tempfile::tempdir;

	#[tokio::test]
	async fn reflects_current_disk_state() {
		let dir = tempdir().unwrap();
		let file = dir.path().join("present.txt");
		std::fs::write(&file, b"hello").unwrap();

		let store = FavoriteStore::load(dir.path().join("favorites.json"), LoadOptions::default()).await;
		store.add(&file, "").await.unwrap();
		store.add(dir.path().join("absent.txt"), "").await.unwrap();

		let statuses = check_all(store.list().await);
		assert_eq!(
			statuses.iter().map(|s| s.exists).collect::<Vec<_>>(),
			vec![true, false]
		);
		assert_eq!(statuses[1].index, 1);

		std::fs::remove_file(&file).unwrap();

		let record = store.get(0).await.unwrap();
		assert!(!exists(&record));
		assert!(!exists_async(&record).await);
	}
}
