use fav_utils::{file_name_of, normalize_path};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmarked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
	path: PathBuf,
	#[serde(default)]
	description: String,
	#[serde(with = "super::timestamp")]
	added_on: DateTime<Utc>,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "super::timestamp::option"
	)]
	updated_on: Option<DateTime<Utc>>,
}

impl BookmarkRecord {
	pub(crate) fn new(path: PathBuf, description: String) -> Self {
		Self {
			path,
			description,
			added_on: Utc::now(),
			updated_on: None,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn added_on(&self) -> DateTime<Utc> {
		self.added_on
	}

	pub fn updated_on(&self) -> Option<DateTime<Utc>> {
		self.updated_on
	}

	/// Name of the bookmarked file, used as the needle when searching for it after a move
	pub fn file_name(&self) -> Option<String> {
		file_name_of(&self.path)
	}

	/// The directory holding the bookmarked file, resolved against the current working
	/// directory when the bookmark is relative.
	pub fn parent_dir(&self) -> Option<PathBuf> {
		resolve(&self.path).parent().map(Path::to_path_buf)
	}

	/// Whether this bookmark points at `path`, comparing both sides normalized. Relative
	/// bookmarks also match their absolute form, as reported by filesystem notifications.
	pub fn points_at(&self, path: &Path) -> bool {
		let target = normalize_path(path);
		self.path == target || (self.path.is_relative() && resolve(&self.path) == target)
	}

	pub(super) fn relocate(&mut self, new_path: PathBuf) {
		self.path = new_path;
		self.updated_on = Some(Utc::now());
	}
}

fn resolve(path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir()
			.map(|cwd| normalize_path(cwd.join(path)))
			.unwrap_or_else(|_| path.to_path_buf())
	}
}
