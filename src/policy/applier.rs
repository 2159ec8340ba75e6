/* src/policy/applier.rs */

use std::sync::Arc;

use parking_lot::Mutex;

use crate::loader::ConfigParser;
use crate::monitor::{ConfigManager, ConfigMonitor, MonitorError};
use crate::signal::SubscriptionHandle;

use super::{LimiterConfig, LimiterStore, MethodTracker, Policy, PolicyMap, PolicyStore, sync_methods};

/// Subscribes `store` to one per-method policy family of `monitor`.
///
/// `select` picks the family out of the scoped config, e.g.
/// `ClientFileConfig::timeouts`. The store is synchronized once against the
/// current snapshot before this returns.
pub fn attach_method_policies<M, Q, P>(
	monitor: &ConfigMonitor<M, Q>,
	store: Arc<dyn PolicyStore<P>>,
	select: fn(&M::Config) -> &PolicyMap<P>,
) -> Result<SubscriptionHandle, MonitorError>
where
	M: ConfigManager,
	Q: ConfigParser,
	P: Policy,
{
	let reader = monitor.reader();
	let tracker = Mutex::new(MethodTracker::new());

	let handle = monitor.register_callback(move || {
		// Read under the lock so a slower pass cannot apply an older snapshot last.
		let mut tracker = tracker.lock();
		let Some(config) = reader.get() else {
			tracing::debug!(key = reader.key(), kind = %P::KIND, "no config yet, nothing to apply");
			return;
		};
		let report = sync_methods(select(&config), &mut tracker, store.as_ref());
		if !report.is_noop() {
			tracing::debug!(
				key = reader.key(),
				kind = %P::KIND,
				applied = report.applied.len(),
				rejected = report.rejected.len(),
				reset = ?report.reset,
				"policy store synchronized"
			);
		}
	});

	prime(monitor, handle)?;
	Ok(handle)
}

/// Subscribes `store` to the scope-wide limiter of `monitor`.
///
/// A missing `limit` section resets the store to its default. An invalid
/// section is logged and leaves the store untouched.
pub fn attach_limiter<M, Q>(
	monitor: &ConfigMonitor<M, Q>,
	store: Arc<dyn LimiterStore>,
	select: fn(&M::Config) -> Option<&LimiterConfig>,
) -> Result<SubscriptionHandle, MonitorError>
where
	M: ConfigManager,
	Q: ConfigParser,
{
	let reader = monitor.reader();
	let pass = Mutex::new(());

	let handle = monitor.register_callback(move || {
		let _pass = pass.lock();
		let Some(config) = reader.get() else {
			return;
		};
		match select(&config) {
			Some(limit) => match limit.check() {
				Ok(()) => store.apply_override(limit),
				Err(e) => tracing::warn!(
					key = reader.key(),
					error = %e,
					"rejected limiter update, keeping previous value"
				),
			},
			None => store.apply_default(),
		}
	});

	prime(monitor, handle)?;
	Ok(handle)
}

fn prime<M: ConfigManager, Q: ConfigParser>(
	monitor: &ConfigMonitor<M, Q>,
	handle: SubscriptionHandle,
) -> Result<(), MonitorError> {
	if let Err(e) = monitor.call_once_specific(handle) {
		monitor.deregister_callback(handle);
		return Err(e);
	}
	Ok(())
}
