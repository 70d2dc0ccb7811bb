//! Progress bar for searches across several roots

use fav_core::SearchProgress;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// One step per search root, cloned into the search's progress callback
#[derive(Clone)]
pub struct SearchProgressBar {
	bar: ProgressBar,
}

impl SearchProgressBar {
	pub fn new(filename: &str) -> Self {
		let bar = ProgressBar::new(0);
		let style = ProgressStyle::with_template(
			"{spinner:.yellow} {prefix} [{bar:30.blue/grey}] {pos}/{len} {wide_msg}",
		)
		.unwrap_or_else(|_| ProgressStyle::default_bar())
		.progress_chars("█▉▊▋▌▍▎▏ ")
		.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

		bar.set_style(style);
		bar.set_prefix(format!("Searching for '{filename}'"));
		bar.enable_steady_tick(Duration::from_millis(100));

		Self { bar }
	}

	/// Called right before each root is searched
	pub fn update(&self, progress: &SearchProgress) {
		self.bar.set_length(progress.total_roots as u64);
		self.bar.set_position(progress.root_index as u64);
		self.bar.set_message(progress.root.display().to_string());
	}

	pub fn finish(&self) {
		self.bar.finish_and_clear();
	}
}
