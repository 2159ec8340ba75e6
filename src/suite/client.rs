/* src/suite/client.rs */

use std::sync::Arc;

use crate::loader::ParserParams;
use crate::monitor::{ClientFileConfig, ClientFileManager, ConfigMonitor, MonitorError};
use crate::policy::{
	CircuitBreakerPolicy, Policy, PolicyMap, PolicyStore, RetryPolicy, TimeoutPolicy, attach_method_policies,
};
use crate::signal::FileWatcher;

use super::ShutdownHooks;

/// Keeps a client's timeout, retry and circuit-breaker stores in step with
/// the file section of one destination service.
pub struct ClientPolicySuite {
	service: String,
	monitor: Arc<ConfigMonitor<ClientFileManager>>,
	hooks: ShutdownHooks,
}

/// Builder for [`ClientPolicySuite`].
#[derive(Default)]
pub struct ClientPolicySuiteBuilder {
	service: Option<String>,
	watcher: Option<Arc<FileWatcher>>,
	params: ParserParams,
	timeout: Option<Arc<dyn PolicyStore<TimeoutPolicy>>>,
	retry: Option<Arc<dyn PolicyStore<RetryPolicy>>>,
	circuit_breaker: Option<Arc<dyn PolicyStore<CircuitBreakerPolicy>>>,
}

impl ClientPolicySuiteBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Destination service name; selects the scope in the file.
	pub fn service(mut self, service: impl Into<String>) -> Self {
		self.service = Some(service.into());
		self
	}

	pub fn watcher(mut self, watcher: Arc<FileWatcher>) -> Self {
		self.watcher = Some(watcher);
		self
	}

	pub fn params(mut self, params: ParserParams) -> Self {
		self.params = params;
		self
	}

	pub fn timeout<S>(mut self, store: Arc<S>) -> Self
	where
		S: PolicyStore<TimeoutPolicy> + 'static,
	{
		let store: Arc<dyn PolicyStore<TimeoutPolicy>> = store;
		self.timeout = Some(store);
		self
	}

	pub fn retry<S>(mut self, store: Arc<S>) -> Self
	where
		S: PolicyStore<RetryPolicy> + 'static,
	{
		let store: Arc<dyn PolicyStore<RetryPolicy>> = store;
		self.retry = Some(store);
		self
	}

	pub fn circuit_breaker<S>(mut self, store: Arc<S>) -> Self
	where
		S: PolicyStore<CircuitBreakerPolicy> + 'static,
	{
		let store: Arc<dyn PolicyStore<CircuitBreakerPolicy>> = store;
		self.circuit_breaker = Some(store);
		self
	}

	/// Starts the monitor and attaches one applier per configured store.
	///
	/// Every store is synchronized with the current file before this returns.
	pub fn build(self) -> Result<ClientPolicySuite, MonitorError> {
		let service = self
			.service
			.ok_or_else(|| MonitorError::Builder("service is required".to_string()))?;
		let watcher = self
			.watcher
			.ok_or_else(|| MonitorError::Builder("watcher is required".to_string()))?;

		let monitor = ConfigMonitor::<ClientFileManager>::builder()
			.key(service.clone())
			.watcher(watcher)
			.manager(ClientFileManager)
			.params(self.params)
			.build()?;
		let monitor = Arc::new(monitor);
		monitor.start()?;

		let suite = ClientPolicySuite {
			service,
			monitor: Arc::clone(&monitor),
			hooks: ShutdownHooks::new(),
		};
		suite.hooks.push(move || monitor.stop());

		if let Some(store) = self.timeout {
			suite.attach(store, ClientFileConfig::timeouts)?;
		}
		if let Some(store) = self.retry {
			suite.attach(store, ClientFileConfig::retries)?;
		}
		if let Some(store) = self.circuit_breaker {
			suite.attach(store, ClientFileConfig::circuit_breakers)?;
		}

		tracing::info!(service = %suite.service, appliers = suite.hooks.len() - 1, "client policy suite ready");
		Ok(suite)
	}
}

impl ClientPolicySuite {
	pub fn builder() -> ClientPolicySuiteBuilder {
		ClientPolicySuiteBuilder::new()
	}

	fn attach<P: Policy>(
		&self,
		store: Arc<dyn PolicyStore<P>>,
		select: fn(&ClientFileConfig) -> &PolicyMap<P>,
	) -> Result<(), MonitorError> {
		let handle = attach_method_policies(&self.monitor, store, select)?;
		let monitor = Arc::clone(&self.monitor);
		self.hooks.push(move || monitor.deregister_callback(handle));
		Ok(())
	}

	pub fn service(&self) -> &str {
		&self.service
	}

	pub fn monitor(&self) -> &ConfigMonitor<ClientFileManager> {
		&self.monitor
	}

	/// The service's current section of the file.
	pub fn config(&self) -> Option<Arc<ClientFileConfig>> {
		self.monitor.config()
	}

	/// Detaches every applier, then stops the monitor. Safe to call repeatedly.
	pub fn close(&self) {
		if self.hooks.run() > 0 {
			tracing::info!(service = %self.service, "client policy suite closed");
		}
	}

	pub fn is_closed(&self) -> bool {
		self.hooks.is_closed()
	}
}

impl Drop for ClientPolicySuite {
	fn drop(&mut self) {
		self.close();
	}
}

impl std::fmt::Debug for ClientPolicySuite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientPolicySuite")
			.field("service", &self.service)
			.field("monitor", &self.monitor)
			.field("hooks", &self.hooks)
			.finish()
	}
}
