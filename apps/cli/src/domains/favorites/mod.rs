mod args;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::Subcommand;

use crate::context::Context;
use crate::util::prelude::*;

use fav_core::{existence, FavoriteStatus};

use self::args::*;

#[derive(Subcommand, Debug)]
pub enum FavoritesCmd {
	/// List favorites and whether they still exist
	List,
	/// Bookmark a file
	Add(AddArgs),
	/// Forget a favorite
	Remove { index: usize },
	/// Point a favorite at the file's new location
	Relocate(RelocateArgs),
	/// Open a favorite with the default application
	Open { index: usize },
}

pub async fn run(ctx: &Context, cmd: FavoritesCmd) -> Result<()> {
	match cmd {
		FavoritesCmd::List => {
			let statuses = ctx.core.list_with_status().await;
			print_output!(ctx, &statuses, |statuses: &Vec<FavoriteStatus>| {
				if statuses.is_empty() {
					println!("No favorites yet");
					return;
				}

				for status in statuses {
					let marker = if status.exists { "" } else { " (missing)" };
					println!("{}. {}{}", status.index, status.record.path().display(), marker);
					if !status.record.description().is_empty() {
						println!("   {}", status.record.description());
					}
				}
			});
		}
		FavoritesCmd::Add(args) => {
			if !args.force && !existence::path_exists(&args.path) {
				bail!(
					"'{}' does not exist, pass --force to add it anyway",
					args.path.display()
				);
			}

			respond(ctx, ctx.core.add_favorite(&args.path, &args.description).await)?;
		}
		FavoritesCmd::Remove { index } => {
			respond(ctx, ctx.core.remove_favorite(index).await)?;
		}
		FavoritesCmd::Relocate(args) => {
			respond(
				ctx,
				ctx.core.update_favorite_path(args.index, &args.path).await,
			)?;
		}
		FavoritesCmd::Open { index } => {
			let record = ctx
				.core
				.list_favorites()
				.await
				.into_iter()
				.nth(index)
				.ok_or_else(|| anyhow!("Invalid index."))?;

			if !ctx.core.check_exists(&record) {
				bail!(
					"'{}' no longer exists, try `fav locate {index}`",
					record.path().display()
				);
			}

			opener::open(record.path())
				.with_context(|| format!("Failed to open '{}'", record.path().display()))?;
		}
	}

	Ok(())
}
