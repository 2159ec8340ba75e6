/* src/monitor/reader.rs */

use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Cheap, cloneable read access to a monitor's current snapshot.
///
/// Reads are wait-free and may observe the previous generation while an
/// update is being published.
pub struct ConfigReader<C> {
	key: Arc<str>,
	snapshot: Arc<ArcSwapOption<C>>,
}

impl<C> ConfigReader<C> {
	pub(crate) fn new(key: Arc<str>, snapshot: Arc<ArcSwapOption<C>>) -> Self {
		Self { key, snapshot }
	}

	/// The scope key of the monitor this reader belongs to.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// The latest scoped config, or `None` before the first successful decode.
	pub fn get(&self) -> Option<Arc<C>> {
		self.snapshot.load_full()
	}
}

impl<C> Clone for ConfigReader<C> {
	fn clone(&self) -> Self {
		Self {
			key: Arc::clone(&self.key),
			snapshot: Arc::clone(&self.snapshot),
		}
	}
}

impl<C: std::fmt::Debug> std::fmt::Debug for ConfigReader<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigReader")
			.field("key", &self.key)
			.field("snapshot", &self.get())
			.finish()
	}
}
