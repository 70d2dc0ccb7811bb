use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: redundant separators and `.` segments are dropped and `..`
/// segments collapse into their parent.
///
/// The filesystem is never touched, so this works on paths that no longer exist. A `..` that
/// would climb above the root of an absolute path is discarded, while leading `..` segments of
/// a relative path are kept. An empty result becomes `.`.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
	let mut anchor = PathBuf::new();
	let mut parts: Vec<Component<'_>> = Vec::new();
	let mut rooted = false;

	for component in path.as_ref().components() {
		match component {
			Component::Prefix(_) => anchor.push(component.as_os_str()),
			Component::RootDir => {
				anchor.push(component.as_os_str());
				rooted = true;
			}
			Component::CurDir => {}
			Component::ParentDir => match parts.last() {
				Some(Component::Normal(_)) => {
					parts.pop();
				}
				_ if rooted => {}
				_ => parts.push(component),
			},
			Component::Normal(_) => parts.push(component),
		}
	}

	let mut normalized = anchor;
	normalized.extend(parts);

	if normalized.as_os_str().is_empty() {
		PathBuf::from(".")
	} else {
		normalized
	}
}

/// The last component of `path` as a string, if it has one
pub fn file_name_of(path: impl AsRef<Path>) -> Option<String> {
	path.as_ref()
		.file_name()
		.map(|name| name.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn collapses_separators_and_dots() {
		assert_eq!(
			normalize_path("/a//b/./c/../f.txt"),
			PathBuf::from("/a/b/f.txt")
		);
		assert_eq!(normalize_path("a/b/"), PathBuf::from("a/b"));
	}

	#[test]
	fn keeps_leading_parent_segments_on_relative_paths() {
		assert_eq!(normalize_path("../x/../y"), PathBuf::from("../y"));
		assert_eq!(normalize_path("../../z"), PathBuf::from("../../z"));
	}

	#[test]
	fn drops_parent_segments_above_root() {
		assert_eq!(normalize_path("/../etc/./hosts"), PathBuf::from("/etc/hosts"));
		assert_eq!(normalize_path("/.."), PathBuf::from("/"));
	}

	#[test]
	fn empty_result_becomes_current_dir() {
		assert_eq!(normalize_path(""), PathBuf::from("."));
		assert_eq!(normalize_path("a/.."), PathBuf::from("."));
		assert_eq!(normalize_path("./"), PathBuf::from("."));
	}

	#[test]
	fn file_name_is_last_component() {
		assert_eq!(file_name_of("/a/b/report.pdf").as_deref(), Some("report.pdf"));
		assert_eq!(file_name_of("/"), None);
	}
}
