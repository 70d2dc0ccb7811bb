//! Moved file search over real directory trees

use fav_core::{
	search::{search, search_blocking, DEFAULT_MAX_DEPTH},
	CancellationToken, SearchError, SearchOutcome, SearchRequest,
};

use std::{
	fs,
	path::{Path, PathBuf},
	sync::{Arc, Mutex},
};

use tempfile::tempdir;
use tracing_test::traced_test;

/// Creates `name` at every depth from 1 to `depth` below `root`, returning them shallowest first
fn nested_copies(root: &Path, name: &str, depth: usize) -> Vec<PathBuf> {
	let mut dir = root.to_path_buf();
	let mut files = Vec::with_capacity(depth);

	for level in 1..=depth {
		fs::create_dir_all(&dir).unwrap();
		let file = dir.join(name);
		fs::write(&file, level.to_string()).unwrap();
		files.push(file);
		dir = dir.join(format!("level{level}"));
	}

	files
}

#[tokio::test]
#[traced_test]
async fn depth_bound_hides_deeper_files() {
	let dir = tempdir().unwrap();
	let files = nested_copies(dir.path(), "target.txt", 8);

	let result = search(
		SearchRequest::new("target.txt", vec![dir.path().to_path_buf()]).with_max_depth(5),
		CancellationToken::new(),
		|_| {},
	)
	.await
	.unwrap();

	assert!(!result.cancelled);
	assert_eq!(result.roots_visited, 1);
	// Traversal order within a directory is up to the filesystem
	let mut found = result.candidates;
	found.sort();
	let mut expected = files[..5].to_vec();
	expected.sort();
	assert_eq!(found, expected);
	assert_eq!(DEFAULT_MAX_DEPTH, 5);
}

#[test]
fn cancelling_returns_a_subset() {
	let dir = tempdir().unwrap();
	let roots = ["first", "second", "third"]
		.map(|name| dir.path().join(name))
		.to_vec();
	let mut every_match = Vec::new();
	for root in &roots {
		every_match.extend(nested_copies(root, "song.ogg", 2));
	}

	let cancel = CancellationToken::new();
	let trigger = cancel.clone();
	let seen = Arc::new(Mutex::new(Vec::new()));
	let seen_by_progress = Arc::clone(&seen);

	let result = search_blocking(
		&SearchRequest::new("song.ogg", roots.clone()),
		&cancel,
		move |progress| {
			assert_eq!(progress.total_roots, 3);
			seen_by_progress.lock().unwrap().push(progress.root_index);
			if progress.root_index == 1 {
				trigger.cancel();
			}
		},
	)
	.unwrap();

	assert!(result.cancelled);
	assert_eq!(result.roots_visited, 1);
	assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
	assert!(result.candidates.iter().all(|c| every_match.contains(c)));
	assert!(result.candidates.iter().all(|c| c.starts_with(&roots[0])));
	assert_eq!(result.candidates.len(), 2);
}

#[tokio::test]
async fn missing_roots_are_skipped() {
	let dir = tempdir().unwrap();
	let files = nested_copies(&dir.path().join("present"), "photo.jpg", 1);

	let result = search(
		SearchRequest::new(
			"photo.jpg",
			vec![dir.path().join("absent"), dir.path().join("present")],
		),
		CancellationToken::new(),
		|_| {},
	)
	.await
	.unwrap();

	assert_eq!(result.roots_visited, 2);
	assert_eq!(result.outcome(), SearchOutcome::Found(files[0].clone()));
}

#[tokio::test]
async fn overlapping_roots_report_each_file_once() {
	let dir = tempdir().unwrap();
	let files = nested_copies(&dir.path().join("music"), "track.flac", 2);

	let result = search(
		SearchRequest::new(
			"track.flac",
			vec![dir.path().to_path_buf(), dir.path().join("music")],
		),
		CancellationToken::new(),
		|_| {},
	)
	.await
	.unwrap();

	assert_eq!(result.candidates.len(), 2);
	assert!(files.iter().all(|f| result.candidates.contains(f)));
	assert!(matches!(result.outcome(), SearchOutcome::Ambiguous(_)));
}

#[tokio::test]
async fn directories_never_match() {
	let dir = tempdir().unwrap();
	fs::create_dir_all(dir.path().join("archive.zip")).unwrap();

	let result = search(
		SearchRequest::new("archive.zip", vec![dir.path().to_path_buf()]),
		CancellationToken::new(),
		|_| {},
	)
	.await
	.unwrap();

	assert_eq!(result.outcome(), SearchOutcome::NotFound);
}

#[tokio::test]
async fn path_like_names_are_rejected() {
	let dir = tempdir().unwrap();

	assert!(matches!(
		search(
			SearchRequest::new("nested/file.txt", vec![dir.path().to_path_buf()]),
			CancellationToken::new(),
			|_| {},
		)
		.await,
		Err(SearchError::InvalidFilename(_))
	));
}
