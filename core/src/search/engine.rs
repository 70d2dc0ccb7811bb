use super::{SearchError, SearchProgress, SearchRequest, SearchResult};

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

/// File names compare the way the platform's default filesystem compares them
const CASE_INSENSITIVE: bool = cfg!(any(windows, target_os = "macos"));

/// Runs [`search_blocking`] on the blocking thread pool
pub async fn search(
	request: SearchRequest,
	cancel: CancellationToken,
	progress: impl FnMut(SearchProgress) + Send + 'static,
) -> Result<SearchResult, SearchError> {
	spawn_blocking(move || search_blocking(&request, &cancel, progress)).await?
}

/// Walks every root of `request` looking for files named `request.filename`.
///
/// Cancellation is checked before each root and at every directory visited; a cancelled
/// search returns the candidates found so far.
#[instrument(skip(cancel, progress), fields(filename = %request.filename), err)]
pub fn search_blocking(
	request: &SearchRequest,
	cancel: &CancellationToken,
	mut progress: impl FnMut(SearchProgress),
) -> Result<SearchResult, SearchError> {
	let matcher = filename_matcher(&request.filename)?;
	let total_roots = request.roots.len();
	let mut result = SearchResult::default();

	for (root_index, root) in request.roots.iter().enumerate() {
		if cancel.is_cancelled() {
			result.cancelled = true;
			break;
		}

		progress(SearchProgress {
			root_index,
			total_roots,
			root: root.clone(),
		});

		if !search_root(root, request.max_depth, &matcher, cancel, &mut result.candidates) {
			result.cancelled = true;
			break;
		}

		result.roots_visited += 1;
	}

	debug!(
		found = result.candidates.len(),
		roots_visited = result.roots_visited,
		cancelled = result.cancelled,
		"Search finished"
	);

	Ok(result)
}

fn filename_matcher(filename: &str) -> Result<GlobMatcher, SearchError> {
	if filename.is_empty()
		|| filename == "."
		|| filename == ".."
		|| filename.contains(['/', std::path::MAIN_SEPARATOR])
	{
		return Err(SearchError::InvalidFilename(filename.to_string()));
	}

	Ok(GlobBuilder::new(&globset::escape(filename))
		.case_insensitive(CASE_INSENSITIVE)
		.literal_separator(true)
		.build()?
		.compile_matcher())
}

/// Returns `false` if the traversal was cancelled before finishing this root
fn search_root(
	root: &Path,
	max_depth: usize,
	matcher: &GlobMatcher,
	cancel: &CancellationToken,
	candidates: &mut Vec<PathBuf>,
) -> bool {
	trace!(root = %root.display(), "Searching root");

	for entry in WalkDir::new(root)
		.follow_links(false)
		.max_depth(max_depth)
		.into_iter()
	{
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				// Unreadable directories are skipped, their siblings are still visited
				trace!(%e, "Skipping entry;");
				continue;
			}
		};

		if entry.file_type().is_dir() {
			if cancel.is_cancelled() {
				return false;
			}
			continue;
		}

		if matcher.is_match(Path::new(entry.file_name()))
			&& !candidates.iter().any(|found| found == entry.path())
		{
			trace!(path = %entry.path().display(), "Found candidate");
			candidates.push(entry.into_path());
		}
	}

	true
}
