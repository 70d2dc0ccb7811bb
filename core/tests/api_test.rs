//! Boundary operations as a UI shell drives them

use fav_core::{
	CancellationToken, FailureKind, FavoritesConfig, FavoritesCore, LoadOutcome, SearchOutcome,
	SearchRoots,
};

use std::fs;

use tempfile::tempdir;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn add_then_remove_round_trip() {
	let data_dir = tempdir().unwrap();
	let core = FavoritesCore::new(FavoritesConfig::default_with_dir(data_dir.path().to_path_buf())).await;
	assert_eq!(core.load_outcome(), &LoadOutcome::Missing);

	let added = core.add_favorite("/tmp/x.txt", "note").await;
	assert!(added.success);
	assert_eq!(added.message, "Added '/tmp/x.txt' to favorites.");

	let favorites = core.list_favorites().await;
	assert_eq!(favorites.len(), 1);
	assert_eq!(favorites[0].description(), "note");

	let removed = core.remove_favorite(0).await;
	assert!(removed.success);
	assert_eq!(removed.message, "Removed '/tmp/x.txt' from favorites.");
	assert!(core.list_favorites().await.is_empty());

	let invalid = core.remove_favorite(0).await;
	assert!(!invalid.success);
	assert_eq!(invalid.message, "Invalid index.");
	assert_eq!(invalid.failure, Some(FailureKind::InvalidIndex));
}

#[tokio::test]
async fn favorites_survive_a_restart() {
	let data_dir = tempdir().unwrap();
	let config = FavoritesConfig::default_with_dir(data_dir.path().to_path_buf());

	let core = FavoritesCore::new(config.clone()).await;
	core.add_favorite("/srv/a.txt", "a").await;
	core.shutdown().await;

	let restarted = FavoritesCore::new(config).await;
	assert_eq!(restarted.list_favorites().await, core.list_favorites().await);
}

#[tokio::test]
async fn moved_favorite_is_located_and_repaired() {
	let data_dir = tempdir().unwrap();
	let files = tempdir().unwrap();
	let original = files.path().join("inbox").join("invoice.pdf");
	let moved = files.path().join("archive").join("2024").join("invoice.pdf");
	fs::create_dir_all(moved.parent().unwrap()).unwrap();
	fs::write(&moved, b"%PDF").unwrap();

	let core = FavoritesCore::new(FavoritesConfig::default_with_dir(data_dir.path().to_path_buf()))
		.await
		.with_search_roots(SearchRoots::new([files.path().to_path_buf()]));
	core.add_favorite(&original, "").await;

	let statuses = core.list_with_status().await;
	assert!(!statuses[0].exists);

	let result = core
		.locate_favorite(0, CancellationToken::new(), |_| {})
		.await
		.unwrap();
	assert_eq!(result.outcome(), SearchOutcome::Found(moved.clone()));

	assert!(core.update_favorite_path(0, &moved).await.success);
	assert!(core.list_with_status().await[0].exists);
}
