use anyhow::{bail, Result};
use tokio::{signal, sync::broadcast::error::RecvError};
use tracing::{info, warn};

use crate::context::{Context, OutputFormat};
use crate::util::prelude::*;

use fav_core::CoreEvent;

/// Follows favorites across renames until Ctrl-C
pub async fn run(ctx: &Context) -> Result<()> {
	if !ctx.core.config().watcher.enabled {
		bail!("The watcher is disabled in the configuration");
	}

	let mut events = ctx.core.subscribe();
	ctx.core.start_watching().await?;

	let watched = ctx.core.watched_dirs().await;
	if let OutputFormat::Human = ctx.format {
		println!(
			"Watching {} directories for renamed favorites, press Ctrl-C to stop",
			watched.len()
		);
	}

	loop {
		tokio::select! {
			_ = signal::ctrl_c() => {
				info!("Ctrl-C received, stopping the watcher");
				break;
			}

			event = events.recv() => match event {
				Ok(event) => print_output!(ctx, &event, print_event),
				Err(RecvError::Lagged(skipped)) => {
					warn!(skipped, "Missed watcher events;");
				}
				Err(RecvError::Closed) => break,
			}
		}
	}

	ctx.core.shutdown().await;

	Ok(())
}

fn print_event(event: &CoreEvent) {
	match event {
		CoreEvent::BookmarkRelocated { index, from, to } => println!(
			"Favorite {index} followed '{}' to '{}'",
			from.display(),
			to.display()
		),
		CoreEvent::WatchRegistrationFailed { directory, reason } => eprintln!(
			"Not watching '{}': {reason}",
			directory.display()
		),
		CoreEvent::RelocationFailed { from, to, reason } => eprintln!(
			"Failed to follow '{}' to '{}': {reason}",
			from.display(),
			to.display()
		),
	}
}
