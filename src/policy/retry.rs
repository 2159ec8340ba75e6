/* src/policy/retry.rs */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Policy, PolicyError, PolicyKind};

/// Per-method retry strategy.
///
/// Exactly one of `failure_policy` and `backup_policy` must be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
	pub enable: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failure_policy: Option<FailurePolicy>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub backup_policy: Option<BackupPolicy>,
}

/// Retry after a failed attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FailurePolicy {
	#[validate(nested)]
	pub stop_policy: StopPolicy,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub backoff_policy: Option<BackoffPolicy>,
	pub retry_same_node: bool,
}

/// Send a backup request when the first one is slow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BackupPolicy {
	#[validate(range(min = 1))]
	pub retry_delay_ms: u64,
	#[validate(nested)]
	pub stop_policy: StopPolicy,
	pub retry_same_node: bool,
}

/// When to give up retrying.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StopPolicy {
	#[validate(range(max = 5))]
	pub max_retry_times: u32,
	pub max_duration_ms: u64,
	pub disable_chain_stop: bool,
	pub ddl_stop: bool,
	#[validate(nested)]
	pub cb_policy: CbPolicy,
}

/// Stops retrying once the method's error rate passes the threshold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CbPolicy {
	#[validate(range(min = 0.0, max = 0.3))]
	pub error_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffType {
	#[default]
	None,
	Fixed,
	Random,
}

/// Delay between retries.
///
/// `fixed` reads `fix_ms`; `random` reads `min_ms` and `max_ms`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
	pub backoff_type: BackoffType,
	pub cfg_items: HashMap<String, f64>,
}

impl BackoffPolicy {
	fn item(&self, name: &str) -> Result<f64, PolicyError> {
		match self.cfg_items.get(name) {
			Some(v) if *v >= 0.0 => Ok(*v),
			Some(v) => Err(PolicyError::InvalidBackoff(format!("{name} must not be negative, got {v}"))),
			None => Err(PolicyError::InvalidBackoff(format!("missing {name}"))),
		}
	}

	fn check(&self) -> Result<(), PolicyError> {
		match self.backoff_type {
			BackoffType::None => Ok(()),
			BackoffType::Fixed => {
				if self.item("fix_ms")? == 0.0 {
					return Err(PolicyError::InvalidBackoff("fix_ms must be positive".into()));
				}
				Ok(())
			}
			BackoffType::Random => {
				let (min, max) = (self.item("min_ms")?, self.item("max_ms")?);
				if min > max {
					return Err(PolicyError::InvalidBackoff(format!(
						"min_ms ({min}) exceeds max_ms ({max})"
					)));
				}
				Ok(())
			}
		}
	}
}

impl RetryPolicy {
	pub fn failure(policy: FailurePolicy) -> Self {
		Self {
			enable: true,
			failure_policy: Some(policy),
			backup_policy: None,
		}
	}

	pub fn backup(policy: BackupPolicy) -> Self {
		Self {
			enable: true,
			failure_policy: None,
			backup_policy: Some(policy),
		}
	}
}

impl Policy for RetryPolicy {
	const KIND: PolicyKind = PolicyKind::Retry;

	fn check(&self) -> Result<(), PolicyError> {
		match (&self.failure_policy, &self.backup_policy) {
			(Some(_), Some(_)) => Err(PolicyError::ConflictingRetryPolicies),
			(None, None) => Err(PolicyError::MissingRetryPolicy),
			(Some(failure), None) => {
				failure.validate()?;
				match &failure.backoff_policy {
					Some(backoff) => backoff.check(),
					None => Ok(()),
				}
			}
			(None, Some(backup)) => Ok(backup.validate()?),
		}
	}
}
