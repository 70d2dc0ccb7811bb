mod args;

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;
use serde::Serialize;
use tokio::{signal, task::JoinHandle};
use tracing::debug;

use crate::context::Context;
use crate::ui::SearchProgressBar;
use crate::util::prelude::*;

use fav_core::{CancellationToken, Response, SearchOutcome, SearchResult};

pub use self::args::SearchScopeArgs;
use self::args::*;

#[derive(Subcommand, Debug)]
pub enum SearchCmd {
	/// Look for a favorite's file after it was moved
	Locate(LocateArgs),
	/// Look for any file by name
	Search(SearchArgs),
}

impl SearchCmd {
	pub fn scope(&self) -> &SearchScopeArgs {
		match self {
			Self::Locate(args) => &args.scope,
			Self::Search(args) => &args.scope,
		}
	}
}

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
	filename: &'a str,
	#[serde(flatten)]
	outcome: SearchOutcome,
	cancelled: bool,
	roots_visited: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	applied: Option<Response>,
}

impl SearchReport<'_> {
	fn print_human(&self) {
		if self.cancelled {
			eprintln!(
				"Search cancelled after {} roots, results may be incomplete",
				self.roots_visited
			);
		}

		match &self.outcome {
			SearchOutcome::NotFound => println!("No file named '{}' found", self.filename),
			SearchOutcome::Found(path) => println!("Found '{}'", path.display()),
			SearchOutcome::Ambiguous(paths) => {
				println!("Found {} files named '{}':", paths.len(), self.filename);
				for path in paths {
					println!("  - {}", path.display());
				}
			}
		}

		if let Some(applied) = &self.applied {
			println!("{}", applied.message);
		}
	}
}

pub async fn run(ctx: &Context, cmd: SearchCmd) -> Result<()> {
	match cmd {
		SearchCmd::Locate(args) => {
			let record = ctx
				.core
				.list_favorites()
				.await
				.into_iter()
				.nth(args.index)
				.ok_or_else(|| anyhow!("Invalid index."))?;
			let filename = record.file_name().unwrap_or_default();

			let bar = SearchProgressBar::new(&filename);
			let progress = bar.clone();
			let (cancel, ctrl_c) = cancel_on_ctrl_c();

			let result = ctx
				.core
				.locate_favorite(args.index, cancel, move |p| progress.update(&p))
				.await;
			ctrl_c.abort();
			bar.finish();
			let result = result?;

			let applied = match (args.apply, result.outcome()) {
				(true, SearchOutcome::Found(path)) => {
					Some(ctx.core.update_favorite_path(args.index, path).await)
				}
				_ => None,
			};

			report(ctx, &filename, &result, applied.clone());

			if args.apply {
				match (result.outcome(), applied) {
					(_, Some(response)) if !response.success => bail!("{}", response.message),
					(SearchOutcome::Ambiguous(_), _) => bail!(
						"Several candidates found, pick one with `fav relocate {} <path>`",
						args.index
					),
					(SearchOutcome::NotFound, _) => bail!("Nothing to relocate to"),
					_ => {}
				}
			}
		}
		SearchCmd::Search(args) => {
			let bar = SearchProgressBar::new(&args.filename);
			let progress = bar.clone();
			let (cancel, ctrl_c) = cancel_on_ctrl_c();

			let result = ctx
				.core
				.search_for_moved_file(&args.filename, cancel, move |p| progress.update(&p))
				.await;
			ctrl_c.abort();
			bar.finish();

			report(ctx, &args.filename, &result?, None);
		}
	}

	Ok(())
}

fn report(ctx: &Context, filename: &str, result: &SearchResult, applied: Option<Response>) {
	let report = SearchReport {
		filename,
		outcome: result.outcome(),
		cancelled: result.cancelled,
		roots_visited: result.roots_visited,
		applied,
	};

	print_output!(ctx, &report, |r: &SearchReport| r.print_human());
}

/// Cancels the returned token on the first Ctrl-C. Abort the handle once the search is over.
fn cancel_on_ctrl_c() -> (CancellationToken, JoinHandle<()>) {
	let cancel = CancellationToken::new();
	let token = cancel.clone();

	let handle = tokio::spawn(async move {
		if signal::ctrl_c().await.is_ok() {
			debug!("Ctrl-C received, cancelling search");
			token.cancel();
		}
	});

	(cancel, handle)
}
