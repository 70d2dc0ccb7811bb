//! Platform-specific rename pairing
//!
//! inotify delivers both halves of a rename together with a cookie, so Linux only needs to
//! wait for the combined event. Windows delivers the halves separately and macOS FSEvents does
//! not even say which half it is, so everything else goes through [`PairedRenameHandler`].

use async_trait::async_trait;

use crate::{event::RawNotifyEvent, FsEvent, Result};

#[cfg(target_os = "linux")]
mod linux;
mod paired;

#[cfg(target_os = "linux")]
pub use linux::LinuxHandler;
pub use paired::PairedRenameHandler;

#[cfg(target_os = "linux")]
pub type PlatformHandler = LinuxHandler;

#[cfg(not(target_os = "linux"))]
pub type PlatformHandler = PairedRenameHandler;

#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
	/// Turn one raw notification into zero or more normalized events
	async fn process(&self, event: RawNotifyEvent) -> Result<Vec<FsEvent>>;

	/// Handlers buffer half-seen renames, so this is called periodically to flush the ones
	/// whose other half never arrived.
	async fn tick(&self) -> Result<Vec<FsEvent>>;

	/// Drop all buffered state
	async fn reset(&self);
}
