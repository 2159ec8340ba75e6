/* src/policy/sync.rs */

use std::collections::HashSet;

use super::{MethodTracker, Policy, PolicyError, PolicyMap, PolicyStore};

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
	/// Methods whose override was (re)applied.
	pub applied: Vec<String>,
	/// Methods whose new value was rejected; their previous override stays.
	pub rejected: Vec<(String, PolicyError)>,
	/// Methods that disappeared from the file and were reset to default.
	pub reset: Vec<String>,
}

impl SyncReport {
	pub fn is_noop(&self) -> bool {
		self.applied.is_empty() && self.rejected.is_empty() && self.reset.is_empty()
	}
}

/// Brings `store` in line with `policies`.
///
/// Rejected entries still count as configured, so they are neither applied
/// nor reset. Methods the tracker held before and that are now absent (or
/// `null`) are reset to default exactly once.
pub fn sync_methods<P: Policy>(
	policies: &PolicyMap<P>,
	tracker: &mut MethodTracker,
	store: &dyn PolicyStore<P>,
) -> SyncReport {
	let mut report = SyncReport::default();
	let mut seen = HashSet::with_capacity(policies.len());

	for (method, policy) in policies {
		let Some(policy) = policy else {
			continue;
		};
		seen.insert(method.clone());

		match policy.check() {
			Ok(()) => {
				store.apply_override(method, policy);
				report.applied.push(method.clone());
			}
			Err(e) => {
				tracing::warn!(
					kind = %P::KIND,
					method = %method,
					error = %e,
					"rejected policy update, keeping previous value"
				);
				report.rejected.push((method.clone(), e));
			}
		}
	}

	for method in tracker.diff_and_replace(seen) {
		store.apply_default(&method);
		report.reset.push(method);
	}

	report.applied.sort();
	report.rejected.sort_by(|a, b| a.0.cmp(&b.0));
	report
}
