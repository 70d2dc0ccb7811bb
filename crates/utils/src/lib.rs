pub mod error;
pub mod path;

pub use error::{report_error, FileIOError};
pub use path::{file_name_of, normalize_path};

/// Combines an iterator of `T` and an iterator of `Option<T>`,
/// removing any `None` values in the process
pub fn chain_optional_iter<T>(
	required: impl IntoIterator<Item = T>,
	optional: impl IntoIterator<Item = Option<T>>,
) -> Vec<T> {
	required
		.into_iter()
		.map(Some)
		.chain(optional)
		.flatten()
		.collect()
}

/// Drops repeated items while keeping the first occurrence of each one in place
pub fn dedup_preserving_order<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
	let mut out = Vec::new();
	for item in items {
		if !out.contains(&item) {
			out.push(item);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chain_skips_missing_values() {
		let out = chain_optional_iter([1, 2], [None, Some(3), None]);
		assert_eq!(out, vec![1, 2, 3]);
	}

	#[test]
	fn dedup_keeps_first_occurrence() {
		let out = dedup_preserving_order(["b", "a", "b", "c", "a"]);
		assert_eq!(out, vec!["b", "a", "c"]);
	}
}
