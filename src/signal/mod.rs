/* src/signal/mod.rs */

//!
//! Single-file watching with callback fan-out.
//!
//! A [`FileWatcher`] observes one file through `notify` and hands the file's
//! bytes to every registered callback whenever it changes. Callbacks are kept
//! in a [`Registry`] keyed by [`SubscriptionHandle`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

mod registry;
mod watcher;
mod worker;

pub use registry::Registry;
pub use watcher::{FileCallback, FileWatcher};

/// Custom error type for the signal module.
#[derive(thiserror::Error, Debug)]
pub enum SignalError {
	#[error("IO error on {path:?}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Notify error: {0}")]
	Notify(#[from] notify::Error),

	#[error("Watched file does not exist: {0:?}")]
	FileNotFound(PathBuf),

	#[error("Callback not found: {0}")]
	CallbackNotFound(SubscriptionHandle),

	#[error("Watcher was already started")]
	AlreadyStarted,

	#[error("Watcher has been stopped")]
	Stopped,

	#[error("No Tokio runtime available to host the event loop")]
	NoRuntime,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Identifies one registered callback within a single registry.
///
/// Handles are allocated from a per-registry counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
	pub fn get(&self) -> u64 {
		self.0
	}
}

impl fmt::Display for SubscriptionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Configuration for the watcher behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
	/// Quiet period after the last raw event before dispatching.
	pub debounce: Duration,

	/// Whether to merge a burst of events into a single effective event.
	pub coalesce: bool,
}

impl Default for WatchConfig {
	fn default() -> Self {
		Self {
			debounce: Duration::from_millis(100),
			coalesce: true,
		}
	}
}

/// The kind of filesystem event we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventKind {
	/// File was created.
	Create,
	/// File content was modified.
	Modify,
	/// File was removed.
	Remove,
}
