/* src/policy/mod.rs */

//!
//! Policy kinds and the protocol that keeps policy stores in step with a
//! [`ConfigMonitor`](crate::monitor::ConfigMonitor).
//!
//! Each applier owns a [`MethodTracker`]. On every monitor update it applies
//! the valid per-method overrides, then resets to default every method the
//! tracker reports as gone from the file.

use std::collections::HashMap;
use std::fmt;

mod applier;
mod breaker;
mod diff;
mod error;
mod limiter;
mod retry;
mod sync;
mod timeout;

pub use applier::{attach_limiter, attach_method_policies};
pub use breaker::CircuitBreakerPolicy;
pub use diff::MethodTracker;
pub use error::PolicyError;
pub use limiter::LimiterConfig;
pub use retry::{BackoffPolicy, BackoffType, BackupPolicy, CbPolicy, FailurePolicy, RetryPolicy, StopPolicy};
pub use sync::{SyncReport, sync_methods};
pub use timeout::TimeoutPolicy;

/// Method name → policy. A `null` value counts as "not configured".
pub type PolicyMap<P> = HashMap<String, Option<P>>;

/// The independent policy families that can be overridden per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
	Timeout,
	Retry,
	CircuitBreaker,
	Limiter,
}

impl fmt::Display for PolicyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Timeout => "timeout",
			Self::Retry => "retry",
			Self::CircuitBreaker => "circuit-breaker",
			Self::Limiter => "limiter",
		})
	}
}

/// A decoded policy value that can be checked before it is applied.
pub trait Policy: Clone + Send + Sync + 'static {
	const KIND: PolicyKind;

	/// Rejects values that must never reach a policy store.
	fn check(&self) -> Result<(), PolicyError> {
		Ok(())
	}
}

/// Receives per-method overrides. Implementations must be idempotent.
pub trait PolicyStore<P>: Send + Sync {
	/// Installs `policy` for `method`, replacing any previous override.
	fn apply_override(&self, method: &str, policy: &P);

	/// Drops any override for `method`, returning it to the built-in default.
	fn apply_default(&self, method: &str);
}

/// Receives the single, scope-wide limiter document.
pub trait LimiterStore: Send + Sync {
	fn apply_override(&self, limit: &LimiterConfig);

	fn apply_default(&self);
}
