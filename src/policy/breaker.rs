/* src/policy/breaker.rs */

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Policy, PolicyError, PolicyKind};

/// Per-method circuit breaker thresholds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CircuitBreakerPolicy {
	pub enable: bool,
	/// Error rate that trips the breaker.
	#[validate(range(min = 0.0, max = 1.0))]
	pub err_rate: f64,
	/// Requests observed before the error rate is trusted.
	#[validate(range(min = 0))]
	pub min_sample: i64,
}

impl Policy for CircuitBreakerPolicy {
	const KIND: PolicyKind = PolicyKind::CircuitBreaker;

	fn check(&self) -> Result<(), PolicyError> {
		Ok(self.validate()?)
	}
}
