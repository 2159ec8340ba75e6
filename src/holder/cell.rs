/* src/holder/cell.rs */

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::policy::{LimiterConfig, LimiterStore};

/// A single overridable value with a built-in default.
pub struct PolicyCell<P> {
	current: ArcSwapOption<P>,
	default: Arc<P>,
}

impl<P> PolicyCell<P> {
	pub fn new(default: P) -> Self {
		Self {
			current: ArcSwapOption::empty(),
			default: Arc::new(default),
		}
	}

	/// The override if one is installed, else the default.
	pub fn get(&self) -> Arc<P> {
		self.current
			.load_full()
			.unwrap_or_else(|| Arc::clone(&self.default))
	}

	pub fn get_override(&self) -> Option<Arc<P>> {
		self.current.load_full()
	}

	pub fn is_overridden(&self) -> bool {
		self.current.load().is_some()
	}

	pub fn set(&self, value: P) -> Option<Arc<P>> {
		self.current.swap(Some(Arc::new(value)))
	}

	pub fn reset(&self) -> Option<Arc<P>> {
		self.current.swap(None)
	}
}

impl<P: Default> Default for PolicyCell<P> {
	fn default() -> Self {
		Self::new(P::default())
	}
}

impl<P: std::fmt::Debug> std::fmt::Debug for PolicyCell<P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyCell")
			.field("current", &self.current.load_full())
			.field("default", &self.default)
			.finish()
	}
}

impl LimiterStore for PolicyCell<LimiterConfig> {
	fn apply_override(&self, limit: &LimiterConfig) {
		if self.get_override().is_some_and(|current| *current == *limit) {
			return;
		}
		self.set(*limit);
		tracing::info!(
			connection_limit = limit.connection_limit,
			qps_limit = limit.qps_limit,
			"limiter updated"
		);
	}

	fn apply_default(&self) {
		if self.reset().is_some() {
			tracing::info!("limiter reset to default");
		}
	}
}
