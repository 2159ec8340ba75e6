/* src/suite/server.rs */

use std::sync::Arc;

use crate::loader::ParserParams;
use crate::monitor::{ConfigMonitor, MonitorError, ServerFileConfig, ServerFileManager};
use crate::policy::{LimiterStore, attach_limiter};
use crate::signal::FileWatcher;

use super::ShutdownHooks;

/// Keeps a server's limiter in step with its section of the file.
pub struct ServerPolicySuite {
	server: String,
	monitor: Arc<ConfigMonitor<ServerFileManager>>,
	hooks: ShutdownHooks,
}

/// Builder for [`ServerPolicySuite`].
#[derive(Default)]
pub struct ServerPolicySuiteBuilder {
	server: Option<String>,
	watcher: Option<Arc<FileWatcher>>,
	params: ParserParams,
	limiter: Option<Arc<dyn LimiterStore>>,
}

impl ServerPolicySuiteBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn server(mut self, server: impl Into<String>) -> Self {
		self.server = Some(server.into());
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

	pub fn limiter<S: LimiterStore + 'static>(mut self, store: Arc<S>) -> Self {
		let store: Arc<dyn LimiterStore> = store;
		self.limiter = Some(store);
		self
	}

	pub fn build(self) -> Result<ServerPolicySuite, MonitorError> {
		let server = self
			.server
			.ok_or_else(|| MonitorError::Builder("server is required".to_string()))?;
		let watcher = self
			.watcher
			.ok_or_else(|| MonitorError::Builder("watcher is required".to_string()))?;
		let limiter = self
			.limiter
			.ok_or_else(|| MonitorError::Builder("limiter is required".to_string()))?;

		let monitor = ConfigMonitor::<ServerFileManager>::builder()
			.key(server.clone())
			.watcher(watcher)
			.manager(ServerFileManager)
			.params(self.params)
			.build()?;
		let monitor = Arc::new(monitor);
		monitor.start()?;

		let suite = ServerPolicySuite {
			server,
			monitor: Arc::clone(&monitor),
			hooks: ShutdownHooks::new(),
		};
		suite.hooks.push(move || monitor.stop());

		let handle = attach_limiter(&suite.monitor, limiter, ServerFileConfig::limit)?;
		let monitor = Arc::clone(&suite.monitor);
		suite.hooks.push(move || monitor.deregister_callback(handle));

		tracing::info!(server = %suite.server, "server policy suite ready");
		Ok(suite)
	}
}

impl ServerPolicySuite {
	pub fn builder() -> ServerPolicySuiteBuilder {
		ServerPolicySuiteBuilder::new()
	}

	pub fn server(&self) -> &str {
		&self.server
	}

	pub fn monitor(&self) -> &ConfigMonitor<ServerFileManager> {
		&self.monitor
	}

	pub fn config(&self) -> Option<Arc<ServerFileConfig>> {
		self.monitor.config()
	}

	/// Detaches the limiter, then stops the monitor.
	pub fn close(&self) {
		if self.hooks.run() > 0 {
			tracing::info!(server = %self.server, "server policy suite closed");
		}
	}

	pub fn is_closed(&self) -> bool {
		self.hooks.is_closed()
	}
}

impl Drop for ServerPolicySuite {
	fn drop(&mut self) {
		self.close();
	}
}

impl std::fmt::Debug for ServerPolicySuite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerPolicySuite")
			.field("server", &self.server)
			.field("monitor", &self.monitor)
			.field("hooks", &self.hooks)
			.finish()
	}
}
