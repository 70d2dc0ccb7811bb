mod context;
mod domains;
mod ui;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fav_core::{config::default_data_dir, FavoritesConfig, FavoritesCore, LoadOutcome};

use crate::context::{Context, OutputFormat};
use crate::domains::{favorites::FavoritesCmd, search::SearchCmd};

#[derive(Parser, Debug)]
#[command(name = "fav", about = "Favorite files that follow their targets", version)]
struct Cli {
	/// Path to the favorites data directory
	#[arg(long, global = true)]
	data_dir: Option<PathBuf>,

	/// Output format
	#[arg(long, global = true, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	#[command(flatten)]
	Favorites(FavoritesCmd),
	#[command(flatten)]
	Search(SearchCmd),
	/// Follow favorites across renames until Ctrl-C
	Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => default_data_dir()?,
	};
	let mut config = FavoritesConfig::load_or_create(&data_dir)?;

	init_tracing(&config.log_level);
	debug!(data_dir = %data_dir.display(), "Loaded configuration");

	if let Commands::Search(cmd) = &cli.command {
		cmd.scope().apply_to(&mut config.search);
	}

	let core = FavoritesCore::new(config).await;
	match core.load_outcome() {
		LoadOutcome::Recovered { reason, backup } => {
			eprintln!("Favorites file was unreadable and has been reset: {reason}");
			if let Some(backup) = backup {
				eprintln!("The old file was kept at '{}'", backup.display());
			}
		}
		LoadOutcome::Unreadable { reason } => {
			eprintln!("Favorites file could not be read, changes may not be saved: {reason}");
		}
		LoadOutcome::Missing | LoadOutcome::Loaded { .. } => {}
	}

	let ctx = Context::new(core, cli.format);

	match cli.command {
		Commands::Favorites(cmd) => domains::favorites::run(&ctx, cmd).await,
		Commands::Search(cmd) => domains::search::run(&ctx, cmd).await,
		Commands::Watch => domains::watch::run(&ctx).await,
	}
}

/// Logs go to stderr, filtered by `RUST_LOG` when set or by the configured level otherwise
fn init_tracing(log_level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"warn,fav_core={log_level},fav_fs_watcher={log_level},fav={log_level}"
		))
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
