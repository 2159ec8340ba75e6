/* src/policy/limiter.rs */

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Policy, PolicyError, PolicyKind};

/// Scope-wide admission limits for a server. Zero means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LimiterConfig {
	#[validate(range(min = 0))]
	pub connection_limit: i64,
	#[validate(range(min = 0))]
	pub qps_limit: i64,
}

impl LimiterConfig {
	pub fn new(connection_limit: i64, qps_limit: i64) -> Self {
		Self {
			connection_limit,
			qps_limit,
		}
	}

	pub fn is_unlimited(&self) -> bool {
		self.connection_limit == 0 && self.qps_limit == 0
	}
}

impl Policy for LimiterConfig {
	const KIND: PolicyKind = PolicyKind::Limiter;

	fn check(&self) -> Result<(), PolicyError> {
		Ok(self.validate()?)
	}
}
