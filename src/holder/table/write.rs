/* src/holder/table/write.rs */

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[cfg(feature = "events")]
use super::super::PolicyEvent;
use super::super::{Entry, Meta};
use super::PolicyTable;
use crate::policy::{Policy, PolicyStore};

impl<P> PolicyTable<P>
where
	P: Clone + Send + Sync,
{
	/// Installs an override for `method`, replacing any previous one.
	pub fn set(&self, method: &str, value: P) -> Arc<P> {
		let value = Arc::new(value);
		let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
		let meta = Meta::now(version);

		let new_entry = Entry {
			value: Arc::clone(&value),
			meta,
		};

		// Capture old_entry inside rcu to ensure event consistency.
		let old_entry: RefCell<Option<Entry<P>>> = RefCell::new(None);

		self.inner.rcu(|map| {
			*old_entry.borrow_mut() = map.get(method).cloned();
			let mut new_map = (**map).clone();
			new_map.insert(method.to_string(), new_entry.clone());
			new_map
		});

		let old_entry = old_entry.into_inner();

		#[cfg(feature = "events")]
		{
			let _ = self.events.send(PolicyEvent::Overridden {
				method: method.to_string(),
				old: old_entry.map(|entry| entry.value),
				new: Arc::clone(&value),
				meta,
			});
		}

		#[cfg(not(feature = "events"))]
		{
			let _ = old_entry;
		}

		value
	}

	/// Drops the override for `method`, returning the removed value.
	pub fn reset(&self, method: &str) -> Option<Arc<P>> {
		// Pre-check to avoid unnecessary clone in rcu.
		if !self.inner.load().contains_key(method) {
			return None;
		}

		let removed: RefCell<Option<Arc<P>>> = RefCell::new(None);

		self.inner.rcu(|map| {
			let mut new_map = (**map).clone();
			*removed.borrow_mut() = new_map.remove(method).map(|entry| entry.value);
			new_map
		});

		let removed = removed.into_inner();

		#[cfg(feature = "events")]
		if let Some(old) = &removed {
			let _ = self.events.send(PolicyEvent::Reset {
				method: method.to_string(),
				old: Arc::clone(old),
			});
		}

		removed
	}

	/// Drops every override.
	pub fn clear(&self) -> usize {
		let previous = self.inner.swap(Arc::default());

		#[cfg(feature = "events")]
		for (method, entry) in previous.iter() {
			let _ = self.events.send(PolicyEvent::Reset {
				method: method.clone(),
				old: Arc::clone(&entry.value),
			});
		}

		previous.len()
	}
}

impl<P> PolicyStore<P> for PolicyTable<P>
where
	P: Policy + PartialEq,
{
	fn apply_override(&self, method: &str, policy: &P) {
		if self.get_override(method).is_some_and(|current| *current == *policy) {
			return;
		}
		self.set(method, policy.clone());
		tracing::debug!(kind = %P::KIND, method, "override installed");
	}

	fn apply_default(&self, method: &str) {
		if self.reset(method).is_some() {
			tracing::debug!(kind = %P::KIND, method, "override dropped");
		}
	}
}
