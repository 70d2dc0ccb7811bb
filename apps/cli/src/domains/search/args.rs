use clap::Args;
use std::path::PathBuf;

use fav_core::config::SearchConfig;

/// Overrides for where and how deep a search looks
#[derive(Args, Debug, Clone, Default)]
pub struct SearchScopeArgs {
	/// Directory to search instead of the configured roots (can be specified multiple times)
	#[arg(long = "root")]
	pub roots: Vec<PathBuf>,

	/// How many levels below each root are searched
	#[arg(long)]
	pub max_depth: Option<usize>,
}

impl SearchScopeArgs {
	pub fn apply_to(&self, config: &mut SearchConfig) {
		if !self.roots.is_empty() {
			config.roots = Some(self.roots.clone());
		}

		if let Some(max_depth) = self.max_depth {
			config.max_depth = max_depth;
		}
	}
}

#[derive(Args, Debug)]
pub struct LocateArgs {
	/// Favorite to look for, as shown by `list`
	pub index: usize,

	/// Relocate the favorite when exactly one candidate is found
	#[arg(long, default_value_t = false)]
	pub apply: bool,

	#[command(flatten)]
	pub scope: SearchScopeArgs,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
	/// File name to look for
	pub filename: String,

	#[command(flatten)]
	pub scope: SearchScopeArgs,
}
