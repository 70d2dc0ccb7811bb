use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Events a UI shell reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
	/// A watched favorite was renamed or moved and the store now points at its new path
	BookmarkRelocated {
		index: usize,
		from: PathBuf,
		to: PathBuf,
	},
	/// A favorite's directory couldn't be watched, it won't follow renames
	WatchRegistrationFailed { directory: PathBuf, reason: String },
	/// A rename was seen for a favorite but the store could not be updated
	RelocationFailed {
		from: PathBuf,
		to: PathBuf,
		reason: String,
	},
}

/// Event bus for broadcasting core events
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Emit an event to all subscribers
	pub fn emit(&self, event: CoreEvent) {
		match self.sender.send(event) {
			Ok(count) => trace!(count, "Event emitted"),
			Err(broadcast::error::SendError(event)) => {
				trace!(?event, "Event emitted without subscribers")
			}
		}
	}

	pub fn subscribe(&self) -> EventSubscriber {
		EventSubscriber {
			receiver: self.sender.subscribe(),
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}

/// Event subscriber for receiving events
#[derive(Debug)]
pub struct EventSubscriber {
	receiver: broadcast::Receiver<CoreEvent>,
}

impl EventSubscriber {
	/// Receive the next event
	pub async fn recv(&mut self) -> Result<CoreEvent, broadcast::error::RecvError> {
		self.receiver.recv().await
	}

	/// Try to receive an event without blocking
	pub fn try_recv(&mut self) -> Result<CoreEvent, broadcast::error::TryRecvError> {
		self.receiver.try_recv()
	}
}
