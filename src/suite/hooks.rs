/* src/suite/hooks.rs */

use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;

type Hook = Box<dyn FnOnce() + Send>;

/// Ordered cleanup actions, run once in reverse registration order.
pub struct ShutdownHooks {
	hooks: Mutex<Option<Vec<Hook>>>,
}

impl ShutdownHooks {
	pub fn new() -> Self {
		Self {
			hooks: Mutex::new(Some(Vec::new())),
		}
	}

	/// Queues `hook`. After [`run`](Self::run) it executes immediately instead.
	pub fn push<F>(&self, hook: F)
	where
		F: FnOnce() + Send + 'static,
	{
		let mut guard = self.hooks.lock();
		match guard.as_mut() {
			Some(hooks) => hooks.push(Box::new(hook)),
			None => {
				drop(guard);
				invoke(Box::new(hook));
			}
		}
	}

	/// Runs every queued hook, newest first. Later calls do nothing.
	pub fn run(&self) -> usize {
		let Some(hooks) = self.hooks.lock().take() else {
			return 0;
		};
		let count = hooks.len();
		for hook in hooks.into_iter().rev() {
			invoke(hook);
		}
		count
	}

	pub fn is_closed(&self) -> bool {
		self.hooks.lock().is_none()
	}

	pub fn len(&self) -> usize {
		self.hooks.lock().as_ref().map_or(0, Vec::len)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for ShutdownHooks {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ShutdownHooks {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ShutdownHooks")
			.field("pending", &self.len())
			.field("closed", &self.is_closed())
			.finish()
	}
}

fn invoke(hook: Hook) {
	if catch_unwind(AssertUnwindSafe(hook)).is_err() {
		tracing::error!("shutdown hook panicked");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	#[test]
	fn test_runs_in_reverse_once() {
		let hooks = ShutdownHooks::new();
		let order = Arc::new(Mutex::new(Vec::new()));
		for i in 0..3 {
			let order = Arc::clone(&order);
			hooks.push(move || order.lock().push(i));
		}

		assert_eq!(hooks.run(), 3);
		assert_eq!(hooks.run(), 0);
		assert_eq!(*order.lock(), vec![2, 1, 0]);
		assert!(hooks.is_closed());
	}

	#[test]
	fn test_panicking_hook_does_not_stop_the_rest() {
		fn boom() {
			panic!("boom");
		}

		let hooks = ShutdownHooks::new();
		let ran = Arc::new(Mutex::new(false));
		let flag = Arc::clone(&ran);
		hooks.push(move || *flag.lock() = true);
		hooks.push(boom);

		hooks.run();
		assert!(*ran.lock());
	}

	#[test]
	fn test_push_after_run_executes_immediately() {
		let hooks = ShutdownHooks::new();
		hooks.run();

		let ran = Arc::new(Mutex::new(false));
		let flag = Arc::clone(&ran);
		hooks.push(move || *flag.lock() = true);
		assert!(*ran.lock());
	}
}
