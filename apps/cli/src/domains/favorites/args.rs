use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AddArgs {
	/// File to bookmark
	pub path: PathBuf,

	/// Note shown next to the favorite
	#[arg(short, long, default_value = "")]
	pub description: String,

	/// Add the path even if nothing exists there right now
	#[arg(long, default_value_t = false)]
	pub force: bool,
}

#[derive(Args, Debug)]
pub struct RelocateArgs {
	/// Favorite to update, as shown by `list`
	pub index: usize,

	/// Where the file lives now
	pub path: PathBuf,
}
