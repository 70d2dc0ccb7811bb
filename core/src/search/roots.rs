use crate::config::SearchConfig;

use fav_utils::{chain_optional_iter, dedup_preserving_order};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of directories to search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRoots(Vec<PathBuf>);

impl SearchRoots {
	pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
		Self(dedup_preserving_order(roots))
	}

	/// The user's well-known folders first, then their home directory, then the filesystem
	/// root (every mounted drive on Windows).
	pub fn platform_default() -> Self {
		let well_known = chain_optional_iter(
			[],
			[
				dirs::document_dir(),
				dirs::download_dir(),
				dirs::desktop_dir(),
				dirs::picture_dir(),
				dirs::video_dir(),
				dirs::audio_dir(),
				dirs::home_dir(),
			],
		);

		Self::new(well_known.into_iter().chain(filesystem_roots()))
	}

	/// Roots from the configuration, or the platform defaults when none are configured
	pub fn from_config(config: &SearchConfig) -> Self {
		config
			.roots
			.clone()
			.map(Self::new)
			.unwrap_or_else(Self::platform_default)
	}

	pub fn as_slice(&self) -> &[PathBuf] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<SearchRoots> for Vec<PathBuf> {
	fn from(roots: SearchRoots) -> Self {
		roots.0
	}
}

#[cfg(windows)]
fn filesystem_roots() -> Vec<PathBuf> {
	('A'..='Z')
		.map(|letter| PathBuf::from(format!("{letter}:\\")))
		.filter(|drive| drive.exists())
		.collect()
}

#[cfg(not(windows))]
fn filesystem_roots() -> Vec<PathBuf> {
	vec![PathBuf::from("/")]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicates_are_dropped_in_order() {
		let roots = SearchRoots::new([
			PathBuf::from("/home/ana"),
			PathBuf::from("/home/ana/Documents"),
			PathBuf::from("/home/ana"),
		]);

		assert_eq!(
			roots.as_slice(),
			&[
				PathBuf::from("/home/ana"),
				PathBuf::from("/home/ana/Documents")
			]
		);
	}

	#[test]
	fn configured_roots_replace_defaults() {
		let config = SearchConfig {
			roots: Some(vec![PathBuf::from("/mnt/archive")]),
			..Default::default()
		};

		assert_eq!(
			SearchRoots::from_config(&config).as_slice(),
			&[PathBuf::from("/mnt/archive")]
		);
	}

	#[cfg(unix)]
	#[test]
	fn defaults_end_with_the_filesystem_root() {
		let roots = SearchRoots::platform_default();

		assert_eq!(roots.as_slice().last(), Some(&PathBuf::from("/")));
		if let Some(home) = dirs::home_dir() {
			assert!(roots.as_slice().contains(&home));
		}
	}
}
