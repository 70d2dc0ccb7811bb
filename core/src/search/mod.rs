//! Locating a moved file by name.
//!
//! When a favorite's path stops resolving, its file name is looked up under a set of root
//! directories. The traversal is bounded in depth, skips whatever it can't read, and stops
//! early when its [`CancellationToken`](tokio_util::sync::CancellationToken) fires.

mod engine;
mod roots;

pub use engine::{search, search_blocking};
pub use roots::SearchRoots;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of levels searched below each root
pub const DEFAULT_MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
	/// Bare file name to look for, without any directory component
	pub filename: String,
	pub roots: Vec<PathBuf>,
	/// A file directly inside a root is at depth 1
	pub max_depth: usize,
}

impl SearchRequest {
	pub fn new(filename: impl Into<String>, roots: impl Into<Vec<PathBuf>>) -> Self {
		Self {
			filename: filename.into(),
			roots: roots.into(),
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}

	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}
}

/// Reported right before each root is traversed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchProgress {
	pub root_index: usize,
	pub total_roots: usize,
	pub root: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
	/// Matching paths in the order they were found, without duplicates
	pub candidates: Vec<PathBuf>,
	/// The search stopped early, `candidates` holds what was found until then
	pub cancelled: bool,
	/// Roots that were traversed completely
	pub roots_visited: usize,
}

/// How a caller should treat a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "paths", rename_all = "snake_case")]
pub enum SearchOutcome {
	NotFound,
	Found(PathBuf),
	Ambiguous(Vec<PathBuf>),
}

impl SearchResult {
	pub fn outcome(&self) -> SearchOutcome {
		match self.candidates.as_slice() {
			[] => SearchOutcome::NotFound,
			[single] => SearchOutcome::Found(single.clone()),
			many => SearchOutcome::Ambiguous(many.to_vec()),
		}
	}
}

#[derive(Error, Debug)]
pub enum SearchError {
	#[error("'{0}' is not a bare file name")]
	InvalidFilename(String),
	#[error("failed to build file name matcher: {0}")]
	Glob(#[from] globset::Error),
	#[error("search task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}
