use crate::{
	event::RawNotifyEvent,
	platform::{EventHandler, PlatformHandler},
	FsEvent, Result, WatcherError,
};

use std::{
	collections::BTreeSet,
	path::{Path, PathBuf},
	pin::pin,
	time::Duration,
};

use async_channel as chan;
use futures::StreamExt;
use futures_concurrency::stream::Merge;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{
	runtime::Handle,
	spawn,
	sync::mpsc,
	task::JoinHandle,
	time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, instrument, trace, warn};

#[derive(Debug, Clone)]
pub struct FsWatcherConfig {
	/// How often buffered rename halves are checked for expiry
	pub tick_interval: Duration,
	/// How long half of a rename waits for its other half
	pub rename_timeout: Duration,
}

/// Shortest tick the event pump accepts, a zero period would stall the interval timer
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

impl Default for FsWatcherConfig {
	fn default() -> Self {
		Self {
			tick_interval: Duration::from_millis(100),
			rename_timeout: Duration::from_millis(500),
		}
	}
}

/// Non-recursive directory watcher emitting normalized [`FsEvent`]s.
///
/// Must be created from within a tokio runtime, the event pump runs as a task on it.
#[derive(Debug)]
pub struct FsWatcher {
	watcher: Option<RecommendedWatcher>,
	watched: BTreeSet<PathBuf>,
	handle: Option<JoinHandle<()>>,
	stop_tx: chan::Sender<()>,
}

impl FsWatcher {
	/// Creates the platform watcher and starts the event pump.
	///
	/// Normalized events are delivered on the returned receiver, which is closed once the
	/// watcher is stopped.
	pub fn new(config: FsWatcherConfig) -> Result<(Self, mpsc::UnboundedReceiver<FsEvent>)> {
		let (raw_tx, raw_rx) = chan::unbounded();
		let (stop_tx, stop_rx) = chan::bounded(1);
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		let watcher = RecommendedWatcher::new(
			move |result| {
				if !raw_tx.is_closed() {
					// SAFETY: we are not blocking the thread as this is an unbounded channel
					if raw_tx.send_blocking(result).is_err() {
						error!("Unable to send watcher event to the event pump;");
					}
				} else {
					trace!("Dropping file system event received after shutdown;");
				}
			},
			Config::default(),
		)
		.map_err(WatcherError::Create)?;

		let tick_interval = if config.tick_interval < MIN_TICK_INTERVAL {
			warn!(
				requested = ?config.tick_interval,
				used = ?MIN_TICK_INTERVAL,
				"Tick interval too short, clamping;"
			);
			MIN_TICK_INTERVAL
		} else {
			config.tick_interval
		};

		let handle = spawn(Self::pump_events(
			PlatformHandler::new(config.rename_timeout),
			tick_interval,
			raw_rx,
			stop_rx,
			events_tx,
		));

		Ok((
			Self {
				watcher: Some(watcher),
				watched: BTreeSet::new(),
				handle: Some(handle),
				stop_tx,
			},
			events_rx,
		))
	}

	async fn pump_events(
		handler: impl EventHandler,
		tick_interval: Duration,
		raw_rx: chan::Receiver<notify::Result<Event>>,
		stop_rx: chan::Receiver<()>,
		events_tx: mpsc::UnboundedSender<FsEvent>,
	) {
		enum StreamMessage {
			NewEvent(notify::Result<Event>),
			Tick,
			Stop,
		}

		let mut tick = interval_at(Instant::now() + tick_interval, tick_interval);
		// In case of doubt check: https://docs.rs/tokio/latest/tokio/time/enum.MissedTickBehavior.html
		tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

		let mut msg_stream = pin!((
			raw_rx.map(StreamMessage::NewEvent),
			IntervalStream::new(tick).map(|_| StreamMessage::Tick),
			stop_rx.map(|()| StreamMessage::Stop),
		)
			.merge());

		while let Some(msg) = msg_stream.next().await {
			let produced = match msg {
				StreamMessage::NewEvent(Ok(event)) => {
					handler.process(RawNotifyEvent::from(event)).await
				}
				StreamMessage::NewEvent(Err(e)) => {
					error!(?e, "Watcher error;");
					continue;
				}
				StreamMessage::Tick => handler.tick().await,
				StreamMessage::Stop => {
					debug!("Stopping file system event pump");
					break;
				}
			};

			match produced {
				Ok(events) => {
					for event in events {
						if events_tx.send(event).is_err() {
							debug!("Event receiver dropped, stopping event pump");
							return;
						}
					}
				}
				Err(e) => error!(?e, "Failed to process file system event;"),
			}
		}

		handler.reset().await;
		info!("File system event pump gracefully shutdown");
	}

	/// Watches a single directory, without descending into its subdirectories
	#[instrument(skip(self, path), fields(path = %path.display()))]
	pub fn watch(&mut self, path: &Path) -> Result<()> {
		let watcher = self.watcher.as_mut().ok_or(WatcherError::Stopped)?;

		watcher
			.watch(path, RecursiveMode::NonRecursive)
			.map_err(|source| WatcherError::Watch {
				path: path.to_path_buf(),
				source,
			})?;

		self.watched.insert(path.to_path_buf());
		trace!("Now watching directory");

		Ok(())
	}

	#[instrument(skip(self, path), fields(path = %path.display()))]
	pub fn unwatch(&mut self, path: &Path) -> Result<()> {
		let watcher = self.watcher.as_mut().ok_or(WatcherError::Stopped)?;

		self.watched.remove(path);
		watcher.unwatch(path).map_err(|source| WatcherError::Unwatch {
			path: path.to_path_buf(),
			source,
		})?;

		trace!("Stopped watching directory");

		Ok(())
	}

	pub fn watched(&self) -> impl Iterator<Item = &Path> {
		self.watched.iter().map(PathBuf::as_path)
	}

	pub fn is_watching(&self, path: &Path) -> bool {
		self.watched.contains(path)
	}

	/// Releases every OS watch and waits for the event pump to finish.
	///
	/// Once this returns no further events are produced and the receiver handed out by
	/// [`FsWatcher::new`] is closed.
	pub async fn stop(&mut self) {
		// Dropping the platform watcher unregisters all watches and closes the raw channel
		self.watcher.take();
		self.watched.clear();

		if let Some(handle) = self.handle.take() {
			if self.stop_tx.send(()).await.is_err() {
				trace!("Event pump already finished");
			}

			if let Err(e) = handle.await {
				error!(?e, "Failed to join file system event pump;");
			}
		}
	}
}

impl Drop for FsWatcher {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			warn!("File system watcher dropped without being stopped");
			self.watcher.take();

			let Ok(runtime) = Handle::try_current() else {
				// Nothing to join on outside a runtime, only signal the pump
				if self.stop_tx.try_send(()).is_err() {
					trace!("Event pump already finished");
				}
				return;
			};

			let stop_tx = self.stop_tx.clone();
			runtime.spawn(async move {
				if stop_tx.send(()).await.is_err() {
					trace!("Event pump already finished");
				}

				if let Err(e) = handle.await {
					error!(?e, "Failed to join file system event pump;");
				}
			});
		}
	}
}
