/* src/monitor/manager.rs */

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::policy::{CircuitBreakerPolicy, LimiterConfig, PolicyMap, RetryPolicy, TimeoutPolicy};

/// Maps a fully decoded file to the part one monitor cares about.
pub trait ConfigManager: Send + Sync + 'static {
	/// Shape of the whole file.
	type Document: DeserializeOwned;
	/// Shape of one scope within it.
	type Config: Send + Sync + 'static;

	/// Returns the scope named `key`, or `None` if the file has no such scope.
	fn get_config(&self, document: Self::Document, key: &str) -> Option<Self::Config>;
}

/// Policies a client applies to calls towards one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFileConfig {
	pub timeout: PolicyMap<TimeoutPolicy>,
	pub retry: PolicyMap<RetryPolicy>,
	#[serde(rename = "circuitbreaker")]
	pub circuit_breaker: PolicyMap<CircuitBreakerPolicy>,
}

impl ClientFileConfig {
	pub fn timeouts(&self) -> &PolicyMap<TimeoutPolicy> {
		&self.timeout
	}

	pub fn retries(&self) -> &PolicyMap<RetryPolicy> {
		&self.retry
	}

	pub fn circuit_breakers(&self) -> &PolicyMap<CircuitBreakerPolicy> {
		&self.circuit_breaker
	}
}

/// Policies a server applies to itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerFileConfig {
	pub limit: Option<LimiterConfig>,
}

impl ServerFileConfig {
	pub fn limit(&self) -> Option<&LimiterConfig> {
		self.limit.as_ref()
	}
}

/// File layout: destination service name → [`ClientFileConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientFileManager;

impl ConfigManager for ClientFileManager {
	type Document = HashMap<String, ClientFileConfig>;
	type Config = ClientFileConfig;

	fn get_config(&self, mut document: Self::Document, key: &str) -> Option<Self::Config> {
		document.remove(key)
	}
}

/// File layout: server name → [`ServerFileConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFileManager;

impl ConfigManager for ServerFileManager {
	type Document = HashMap<String, ServerFileConfig>;
	type Config = ServerFileConfig;

	fn get_config(&self, mut document: Self::Document, key: &str) -> Option<Self::Config> {
		document.remove(key)
	}
}
