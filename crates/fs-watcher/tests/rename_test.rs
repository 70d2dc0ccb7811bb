use fav_fs_watcher::{FsEventKind, FsWatcher, FsWatcherConfig};

use std::time::Duration;

use tokio::{fs, time::timeout};
use tracing_test::traced_test;

#[tokio::test(flavor = "multi_thread")]
#[traced_test]
async fn rename_inside_watched_directory_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	let from = dir.path().join("report.txt");
	let to = dir.path().join("report-final.txt");
	fs::write(&from, b"quarterly numbers").await.unwrap();

	let (mut watcher, mut events) = FsWatcher::new(FsWatcherConfig::default()).unwrap();
	watcher.watch(dir.path()).unwrap();

	// Give the backend a moment to settle before generating events
	tokio::time::sleep(Duration::from_millis(100)).await;
	fs::rename(&from, &to).await.unwrap();

	let renamed = timeout(Duration::from_secs(5), async {
		while let Some(event) = events.recv().await {
			if let FsEventKind::Rename { from, to } = event.kind {
				return Some((from, to));
			}
		}
		None
	})
	.await
	.expect("timed out waiting for the rename event")
	.expect("event channel closed before a rename arrived");

	assert_eq!(renamed.0.file_name(), from.file_name());
	assert_eq!(renamed.1.file_name(), to.file_name());

	watcher.stop().await;
}
