use super::{BookmarkRecord, StoreError};

use fav_utils::{normalize_path, FileIOError};

use std::{
	ffi::OsString,
	io,
	path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
use tracing::{debug, error, info, instrument, trace, warn};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
	/// Rename an unparseable store file to `<file>.bak` instead of letting the next save
	/// overwrite it
	pub backup_corrupt: bool,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			backup_corrupt: true,
		}
	}
}

/// What happened when the store file was read at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
	/// No store file yet, starting empty
	Missing,
	Loaded {
		records: usize,
		/// Records dropped because their path was empty
		dropped: usize,
	},
	/// The file could not be parsed and the store started empty
	Recovered {
		reason: String,
		backup: Option<PathBuf>,
	},
	/// The file exists but could not be read, the store started empty
	Unreadable { reason: String },
}

/// Sole owner of the favorites list and of the file it is persisted to.
///
/// Every mutation serializes the whole list to a temporary file and swaps it over the store
/// file before the in-memory list changes. A failed write leaves both untouched. The write
/// lock is held for the whole mutation, so mutations never interleave and readers never see a
/// half-applied one.
#[derive(Debug)]
pub struct FavoriteStore {
	path: PathBuf,
	records: RwLock<Vec<BookmarkRecord>>,
	load_outcome: LoadOutcome,
}

impl FavoriteStore {
	#[instrument(skip_all, fields(path = %path.as_ref().display()))]
	pub async fn load(path: impl AsRef<Path>, options: LoadOptions) -> Self {
		let path = path.as_ref().to_path_buf();

		let (records, load_outcome) = match fs::read(&path).await {
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				debug!("No favorites store yet, starting empty");
				(Vec::new(), LoadOutcome::Missing)
			}
			Err(e) => {
				let e = FileIOError::from((&path, e, "reading favorites store"));
				error!(?e, "Failed to read favorites store, starting empty;");
				(
					Vec::new(),
					LoadOutcome::Unreadable {
						reason: e.to_string(),
					},
				)
			}
			Ok(bytes) => match parse(&path, &bytes) {
				Ok(parsed) => {
					let total = parsed.len();
					let records = parsed
						.into_iter()
						.filter(|record| {
							let keep = !record.path().as_os_str().is_empty();
							if !keep {
								warn!("Dropping favorite with an empty path");
							}
							keep
						})
						.collect::<Vec<_>>();

					info!(count = records.len(), "Loaded favorites");
					let outcome = LoadOutcome::Loaded {
						records: records.len(),
						dropped: total - records.len(),
					};
					(records, outcome)
				}
				Err(e) => {
					warn!(%e, "Favorites store is corrupt, starting with an empty list;");
					let backup = if options.backup_corrupt {
						backup_corrupt_file(&path).await
					} else {
						None
					};

					(
						Vec::new(),
						LoadOutcome::Recovered {
							reason: e.to_string(),
							backup,
						},
					)
				}
			},
		};

		Self {
			path,
			records: RwLock::new(records),
			load_outcome,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn load_outcome(&self) -> &LoadOutcome {
		&self.load_outcome
	}

	/// Snapshot of all favorites in display order
	pub async fn list(&self) -> Vec<BookmarkRecord> {
		self.records.read().await.clone()
	}

	pub async fn get(&self, index: usize) -> Option<BookmarkRecord> {
		self.records.read().await.get(index).cloned()
	}

	pub async fn len(&self) -> usize {
		self.records.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.records.read().await.is_empty()
	}

	/// Index of the favorite pointing at `path`, if any
	pub async fn position_of(&self, path: impl AsRef<Path>) -> Option<usize> {
		let path = path.as_ref();
		self.records
			.read()
			.await
			.iter()
			.position(|record| record.points_at(path))
	}

	/// Appends a new favorite, returning its index and the record as stored
	#[instrument(skip(self, path, description), fields(path = %path.as_ref().display()), err)]
	pub async fn add(
		&self,
		path: impl AsRef<Path>,
		description: impl Into<String>,
	) -> Result<(usize, BookmarkRecord), StoreError> {
		let path = non_empty(path.as_ref())?;
		let description = description.into();

		self.mutate(move |records| {
			if records.iter().any(|record| record.path() == path) {
				return Err(StoreError::Duplicate(path));
			}

			let record = BookmarkRecord::new(path, description);
			records.push(record.clone());
			Ok((records.len() - 1, record))
		})
		.await
	}

	/// Deletes the favorite at `index`, returning it
	#[instrument(skip(self), err)]
	pub async fn remove(&self, index: usize) -> Result<BookmarkRecord, StoreError> {
		self.mutate(|records| {
			check_index(records, index)?;
			Ok(records.remove(index))
		})
		.await
	}

	/// Points the favorite at `index` to `new_path`.
	///
	/// Uniqueness is not checked here: a relocation may legitimately land on a path that
	/// another favorite already holds.
	#[instrument(skip(self, new_path), fields(new_path = %new_path.as_ref().display()), err)]
	pub async fn update_path(
		&self,
		index: usize,
		new_path: impl AsRef<Path>,
	) -> Result<BookmarkRecord, StoreError> {
		let new_path = non_empty(new_path.as_ref())?;

		self.mutate(move |records| {
			check_index(records, index)?;
			let record = &mut records[index];
			record.relocate(new_path);
			Ok(record.clone())
		})
		.await
	}

	/// Moves the favorite pointing at `from` over to `to` in a single critical section.
	///
	/// Returns `None` when no favorite points at `from`.
	#[instrument(skip_all, fields(from = %from.display(), to = %to.display()), err)]
	pub async fn relocate(
		&self,
		from: &Path,
		to: &Path,
	) -> Result<Option<(usize, BookmarkRecord)>, StoreError> {
		let to = non_empty(to)?;

		{
			let records = self.records.read().await;
			if !records.iter().any(|record| record.points_at(from)) {
				return Ok(None);
			}
		}

		self.mutate(move |records| {
			let Some(index) = records.iter().position(|record| record.points_at(from)) else {
				// Removed between the two locks
				return Ok(None);
			};

			let record = &mut records[index];
			record.relocate(to);
			Ok(Some((index, record.clone())))
		})
		.await
	}

	/// Writes the current list back to disk
	pub async fn save(&self) -> Result<(), StoreError> {
		let records = self.records.write().await;
		self.persist(&records).await
	}

	async fn mutate<T>(
		&self,
		apply: impl FnOnce(&mut Vec<BookmarkRecord>) -> Result<T, StoreError>,
	) -> Result<T, StoreError> {
		let mut records = self.records.write().await;

		let mut next = records.clone();
		let out = apply(&mut next)?;

		self.persist(&next).await?;
		*records = next;

		Ok(out)
	}

	async fn persist(&self, records: &[BookmarkRecord]) -> Result<(), StoreError> {
		let json = serde_json::to_vec_pretty(records)?;

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| FileIOError::from((parent, e, "creating store directory")))?;
		}

		let tmp = sibling_with_suffix(&self.path, ".tmp");
		if let Err(e) = write_synced(&tmp, &json).await {
			if let Err(e) = fs::remove_file(&tmp).await {
				trace!(?e, "Failed to clean up temporary store file;");
			}
			return Err(FileIOError::from((&tmp, e, "writing favorites")).into());
		}

		if let Err(e) = fs::rename(&tmp, &self.path).await {
			if let Err(e) = fs::remove_file(&tmp).await {
				trace!(?e, "Failed to clean up temporary store file;");
			}
			return Err(FileIOError::from((&self.path, e, "replacing favorites store")).into());
		}

		trace!(count = records.len(), "Persisted favorites");
		Ok(())
	}
}

/// Contents must be on disk before the rename makes them visible under the store's name
async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut file = fs::File::create(path).await?;
	file.write_all(bytes).await?;
	file.sync_all().await
}

fn parse(path: &Path, bytes: &[u8]) -> Result<Vec<BookmarkRecord>, StoreError> {
	serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
		path: path.to_path_buf(),
		source,
	})
}

fn non_empty(path: &Path) -> Result<PathBuf, StoreError> {
	if path.as_os_str().is_empty() {
		Err(StoreError::EmptyPath)
	} else {
		Ok(normalize_path(path))
	}
}

fn check_index(records: &[BookmarkRecord], index: usize) -> Result<(), StoreError> {
	if index < records.len() {
		Ok(())
	} else {
		Err(StoreError::InvalidIndex {
			index,
			len: records.len(),
		})
	}
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
	let mut name = OsString::from(path.as_os_str());
	name.push(suffix);
	PathBuf::from(name)
}

async fn backup_corrupt_file(path: &Path) -> Option<PathBuf> {
	let mut backup = sibling_with_suffix(path, ".bak");
	if fs::try_exists(&backup).await.unwrap_or(true) {
		// Never clobber an earlier backup
		let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
		backup = sibling_with_suffix(path, &format!(".{stamp}.bak"));
		debug!(backup = %backup.display(), "A backup already exists, using a timestamped name");
	}

	match fs::rename(path, &backup).await {
		Ok(()) => {
			warn!(backup = %backup.display(), "Kept the corrupt favorites store as a backup");
			Some(backup)
		}
		Err(e) => {
			error!(e = %FileIOError::from((path, e)), "Failed to back up corrupt favorites store;");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	#[tokio::test]
	async fn missing_file_starts_empty() {
		let dir = tempdir().unwrap();
		let store = FavoriteStore::load(dir.path().join("favorites.json"), LoadOptions::default()).await;

		assert!(store.is_empty().await);
		assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
	}

	#[tokio::test]
	async fn add_normalizes_and_rejects_empty_paths() {
		let dir = tempdir().unwrap();
		let store = FavoriteStore::load(dir.path().join("favorites.json"), LoadOptions::default()).await;

		let (index, record) = store.add("/srv//music/./a/../song.mp3", "tune").await.unwrap();
		assert_eq!(index, 0);
		assert_eq!(record.path(), Path::new("/srv/music/song.mp3"));
		assert_eq!(store.get(0).await.unwrap(), record);

		assert!(matches!(store.add("", "nothing").await, Err(StoreError::EmptyPath)));
		assert!(matches!(
			store.update_path(0, "").await,
			Err(StoreError::EmptyPath)
		));
		assert_eq!(store.len().await, 1);
	}

	#[tokio::test]
	async fn position_of_finds_normalized_matches() {
		let dir = tempdir().unwrap();
		let store = FavoriteStore::load(dir.path().join("favorites.json"), LoadOptions::default()).await;

		store.add("/a/one.txt", "").await.unwrap();
		store.add("/a/two.txt", "").await.unwrap();

		assert_eq!(store.position_of("/a/./two.txt").await, Some(1));
		assert_eq!(store.position_of("/a/three.txt").await, None);
	}

	#[tokio::test]
	async fn persisted_file_is_a_pretty_json_array() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("favorites.json");
		let store = FavoriteStore::load(&path, LoadOptions::default()).await;

		store.add("/tmp/x.txt", "note").await.unwrap();

		let raw = std::fs::read_to_string(&path).unwrap();
		let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
		assert_eq!(json[0]["path"], "/tmp/x.txt");
		assert_eq!(json[0]["description"], "note");
		assert!(json[0]["added_on"].is_string());
		assert!(raw.contains("\n  {"));
		assert!(!sibling_with_suffix(&path, ".tmp").exists());
	}
}
