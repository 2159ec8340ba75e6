/* src/holder/table/read.rs */

use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "events")]
use super::super::PolicyEvent;
use super::super::{Entry, Meta};
use super::PolicyTable;

impl<P> PolicyTable<P>
where
	P: Clone + Send + Sync,
{
	/// Effective policy for `method`: its override, else the default. Wait-free.
	pub fn get(&self, method: &str) -> Arc<P> {
		self.get_override(method)
			.unwrap_or_else(|| Arc::clone(&self.default))
	}

	/// The override for `method`, if one is installed.
	pub fn get_override(&self, method: &str) -> Option<Arc<P>> {
		let snapshot = self.inner.load();
		snapshot.get(method).map(|entry| Arc::clone(&entry.value))
	}

	pub fn get_meta(&self, method: &str) -> Option<Meta> {
		let snapshot = self.inner.load();
		snapshot.get(method).map(|entry| entry.meta)
	}

	pub fn get_entry(&self, method: &str) -> Option<Entry<P>> {
		let snapshot = self.inner.load();
		snapshot.get(method).cloned()
	}

	pub fn default_policy(&self) -> Arc<P> {
		Arc::clone(&self.default)
	}

	pub fn is_overridden(&self, method: &str) -> bool {
		self.inner.load().contains_key(method)
	}

	/// Returns an atomic snapshot of all overrides.
	pub fn snapshot(&self) -> Arc<HashMap<String, Entry<P>>> {
		self.inner.load_full()
	}

	/// Overridden method names, sorted.
	pub fn methods(&self) -> Vec<String> {
		let snapshot = self.inner.load();
		let mut methods: Vec<String> = snapshot.keys().cloned().collect();
		methods.sort();
		methods
	}

	/// Number of overrides.
	pub fn len(&self) -> usize {
		self.inner.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.load().is_empty()
	}

	/// Subscribes to override changes.
	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PolicyEvent<P>> {
		self.events.subscribe()
	}
}
