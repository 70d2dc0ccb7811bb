use fav_core::FavoritesCore;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

pub struct Context {
	pub core: FavoritesCore,
	pub format: OutputFormat,
}

impl Context {
	pub fn new(core: FavoritesCore, format: OutputFormat) -> Self {
		Self { core, format }
	}
}
