/* src/signal/registry.rs */

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::SubscriptionHandle;

/// Callback registry with monotonic handles.
///
/// Dispatch holds the read lock for the whole pass, so `deregister` only
/// returns once no in-flight pass can still reach the removed callback.
/// A callback must not register or deregister on the registry that is
/// currently dispatching it.
pub struct Registry<F: ?Sized> {
	name: &'static str,
	next_id: AtomicU64,
	entries: RwLock<BTreeMap<SubscriptionHandle, Arc<F>>>,
}

impl<F: ?Sized> Registry<F> {
	/// Creates an empty registry. `name` only shows up in logs.
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			next_id: AtomicU64::new(0),
			entries: RwLock::new(BTreeMap::new()),
		}
	}

	/// Adds a callback under a fresh handle.
	pub fn register(&self, callback: Arc<F>) -> SubscriptionHandle {
		let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
		self.entries.write().insert(handle, callback);
		tracing::debug!(registry = self.name, handle = %handle, "callback registered");
		handle
	}

	/// Removes a callback. Unknown handles are logged and otherwise ignored.
	pub fn deregister(&self, handle: SubscriptionHandle) -> bool {
		let removed = self.entries.write().remove(&handle).is_some();
		if removed {
			tracing::debug!(registry = self.name, handle = %handle, "callback deregistered");
		} else {
			tracing::warn!(
				registry = self.name,
				handle = %handle,
				"deregister called for unknown callback"
			);
		}
		removed
	}

	/// Removes every callback, returning how many were dropped.
	pub fn clear(&self) -> usize {
		let mut entries = self.entries.write();
		let count = entries.len();
		entries.clear();
		count
	}

	pub fn contains(&self, handle: SubscriptionHandle) -> bool {
		self.entries.read().contains_key(&handle)
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Invokes every callback once, in registration order.
	///
	/// A panicking callback is logged and skipped; the pass continues.
	/// Returns the number of callbacks that completed normally.
	pub fn dispatch_all(&self, mut invoke: impl FnMut(&F)) -> usize {
		let entries = self.entries.read_recursive();
		let mut completed = 0;
		for (handle, callback) in entries.iter() {
			if self.guarded(*handle, || invoke(&**callback)) {
				completed += 1;
			}
		}
		completed
	}

	/// Invokes a single callback. Returns `false` if the handle is unknown.
	pub fn dispatch_one(&self, handle: SubscriptionHandle, invoke: impl FnOnce(&F)) -> bool {
		let entries = self.entries.read_recursive();
		match entries.get(&handle) {
			Some(callback) => {
				self.guarded(handle, || invoke(&**callback));
				true
			}
			None => false,
		}
	}

	fn guarded(&self, handle: SubscriptionHandle, call: impl FnOnce()) -> bool {
		match panic::catch_unwind(AssertUnwindSafe(call)) {
			Ok(()) => true,
			Err(payload) => {
				tracing::error!(
					registry = self.name,
					handle = %handle,
					panic = panic_message(payload.as_ref()),
					"callback panicked during dispatch"
				);
				false
			}
		}
	}
}

impl<F: ?Sized> std::fmt::Debug for Registry<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("name", &self.name)
			.field("len", &self.len())
			.field("next_id", &self.next_id.load(Ordering::SeqCst))
			.finish()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		s
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.as_str()
	} else {
		"<non-string panic payload>"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	type Cb = dyn Fn(&mut Vec<u64>) + Send + Sync;

	fn pushing(n: u64) -> Arc<Cb> {
		Arc::new(move |out: &mut Vec<u64>| out.push(n))
	}

	#[test]
	fn test_handles_are_monotonic_and_never_reused() {
		let registry: Registry<Cb> = Registry::new("test");
		let a = registry.register(pushing(1));
		let b = registry.register(pushing(2));
		assert!(b > a);

		registry.deregister(b);
		let c = registry.register(pushing(3));
		assert!(c > b);
		assert_eq!(c.get(), 3);
	}

	#[test]
	fn test_deregister_unknown_is_noop() {
		let registry: Registry<Cb> = Registry::new("test");
		let a = registry.register(pushing(1));
		assert!(registry.deregister(a));
		assert!(!registry.deregister(a));
		assert!(!registry.deregister(SubscriptionHandle(42)));
		assert!(registry.is_empty());
	}

	#[test]
	fn test_dispatch_all_in_registration_order() {
		let registry: Registry<Cb> = Registry::new("test");
		for n in 1..=3 {
			registry.register(pushing(n));
		}
		let mut out = Vec::new();
		assert_eq!(registry.dispatch_all(|cb| cb(&mut out)), 3);
		assert_eq!(out, vec![1, 2, 3]);
	}

	#[test]
	fn test_dispatch_one_unknown_handle() {
		let registry: Registry<Cb> = Registry::new("test");
		let a = registry.register(pushing(7));
		let mut out = Vec::new();
		assert!(registry.dispatch_one(a, |cb| cb(&mut out)));
		assert!(!registry.dispatch_one(SubscriptionHandle(99), |cb| cb(&mut out)));
		assert_eq!(out, vec![7]);
	}

	fn boom() {
		panic!("boom");
	}

	#[test]
	fn test_panicking_callback_does_not_stop_dispatch() {
		let registry: Registry<dyn Fn() + Send + Sync> = Registry::new("test");
		let hits = Arc::new(Mutex::new(Vec::new()));

		let h = hits.clone();
		registry.register(Arc::new(move || h.lock().unwrap().push("first")));
		registry.register(Arc::new(boom));
		let h = hits.clone();
		registry.register(Arc::new(move || h.lock().unwrap().push("third")));

		assert_eq!(registry.dispatch_all(|cb| cb()), 2);
		assert_eq!(*hits.lock().unwrap(), vec!["first", "third"]);
		// The panicking callback stays registered.
		assert_eq!(registry.len(), 3);
	}

	#[test]
	fn test_clear() {
		let registry: Registry<Cb> = Registry::new("test");
		registry.register(pushing(1));
		registry.register(pushing(2));
		assert_eq!(registry.clear(), 2);
		assert!(registry.is_empty());
	}
}
