/* src/holder/table/mod.rs */

mod read;
mod write;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwap;

use super::Entry;
#[cfg(feature = "events")]
use super::PolicyEvent;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Per-method policy overrides falling back to a shared default.
///
/// Uses RCU (Read-Copy-Update) for lock-free reads: writers clone the map,
/// modify the clone and swap it in, so a reader always sees a consistent
/// generation.
pub struct PolicyTable<P> {
	pub(crate) inner: ArcSwap<HashMap<String, Entry<P>>>,
	pub(crate) default: Arc<P>,
	pub(crate) version: AtomicU64,
	#[cfg(feature = "events")]
	pub(crate) events: tokio::sync::broadcast::Sender<PolicyEvent<P>>,
}

impl<P> PolicyTable<P>
where
	P: Clone + Send + Sync,
{
	/// Creates an empty table whose methods all resolve to `default`.
	pub fn new(default: P) -> Self {
		Self {
			inner: ArcSwap::from_pointee(HashMap::new()),
			default: Arc::new(default),
			version: AtomicU64::new(0),
			#[cfg(feature = "events")]
			events: tokio::sync::broadcast::channel(DEFAULT_EVENT_CAPACITY).0,
		}
	}

	/// Creates an empty table with a custom event channel capacity.
	///
	/// Events are dropped for subscribers that fall further behind than
	/// `capacity`.
	#[cfg(feature = "events")]
	pub fn with_event_capacity(default: P, capacity: usize) -> Self {
		Self {
			inner: ArcSwap::from_pointee(HashMap::new()),
			default: Arc::new(default),
			version: AtomicU64::new(0),
			events: tokio::sync::broadcast::channel(capacity).0,
		}
	}
}

impl<P> Default for PolicyTable<P>
where
	P: Clone + Default + Send + Sync,
{
	fn default() -> Self {
		Self::new(P::default())
	}
}

impl<P: std::fmt::Debug> std::fmt::Debug for PolicyTable<P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyTable")
			.field("default", &self.default)
			.field("overrides", &self.inner.load().len())
			.finish_non_exhaustive()
	}
}
