/* src/policy/timeout.rs */

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Policy, PolicyKind};

/// Per-method RPC timeouts. Zero means "no timeout".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutPolicy {
	pub conn_timeout_ms: u64,
	pub rpc_timeout_ms: u64,
}

impl TimeoutPolicy {
	pub fn new(conn_timeout_ms: u64, rpc_timeout_ms: u64) -> Self {
		Self {
			conn_timeout_ms,
			rpc_timeout_ms,
		}
	}

	pub fn conn_timeout(&self) -> Option<Duration> {
		(self.conn_timeout_ms > 0).then(|| Duration::from_millis(self.conn_timeout_ms))
	}

	pub fn rpc_timeout(&self) -> Option<Duration> {
		(self.rpc_timeout_ms > 0).then(|| Duration::from_millis(self.rpc_timeout_ms))
	}
}

impl Policy for TimeoutPolicy {
	const KIND: PolicyKind = PolicyKind::Timeout;
}
