/* src/monitor/live.rs */

//!
//! Per-scope configuration monitor on top of a shared file watcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::loader::{ConfigParser, ConfigType, DecodeError, DefaultParser, ParserParams};
use crate::signal::{FileWatcher, Registry, SubscriptionHandle};

use super::{ConfigManager, ConfigReader, MonitorError};

/// Subscriber callback; reads the new state through [`ConfigMonitor::config`].
pub type MonitorCallback = dyn Fn() + Send + Sync;

enum MonitorState {
	Idle,
	Started { handle: SubscriptionHandle },
	Stopped,
}

/// Everything the watcher callback needs, detached from the monitor handle.
struct Dispatcher<M: ConfigManager, P> {
	key: Arc<str>,
	manager: Arc<M>,
	parser: Arc<P>,
	params: ParserParams,
	snapshot: Arc<ArcSwapOption<M::Config>>,
	subscribers: Arc<Registry<MonitorCallback>>,
	stopped: Arc<AtomicBool>,
}

impl<M: ConfigManager, P: ConfigParser> Dispatcher<M, P> {
	fn on_file_change(&self, data: &[u8]) {
		if self.stopped.load(Ordering::SeqCst) {
			return;
		}

		let document: M::Document = match self.parser.decode(self.params.kind, data) {
			Ok(document) => document,
			Err(e) => {
				tracing::warn!(
					key = %self.key,
					error = %e,
					"failed to decode config file, keeping previous config"
				);
				return;
			}
		};

		let Some(config) = self.manager.get_config(document, &self.key) else {
			tracing::warn!(key = %self.key, "scope not found in config file, keeping previous config");
			return;
		};

		self.snapshot.store(Some(Arc::new(config)));
		let notified = self.subscribers.dispatch_all(|callback| callback());
		tracing::debug!(key = %self.key, notified, "config snapshot updated");
	}
}

/// Keeps the latest configuration of one scope and notifies subscribers.
///
/// The monitor registers a single callback on its [`FileWatcher`]; several
/// monitors with different keys can share the same watcher.
pub struct ConfigMonitor<M: ConfigManager, P: ConfigParser = DefaultParser> {
	key: Arc<str>,
	watcher: Arc<FileWatcher>,
	manager: Option<Arc<M>>,
	parser: Arc<P>,
	params: ParserParams,
	snapshot: Arc<ArcSwapOption<M::Config>>,
	subscribers: Arc<Registry<MonitorCallback>>,
	stopped: Arc<AtomicBool>,
	state: Mutex<MonitorState>,
}

/// Builder for [`ConfigMonitor`].
pub struct ConfigMonitorBuilder<M, P = DefaultParser> {
	key: Option<String>,
	watcher: Option<Arc<FileWatcher>>,
	manager: Option<M>,
	parser: P,
	params: ParserParams,
}

impl<M, P> ConfigMonitorBuilder<M, P>
where
	M: ConfigManager,
	P: ConfigParser,
{
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn watcher(mut self, watcher: Arc<FileWatcher>) -> Self {
		self.watcher = Some(watcher);
		self
	}

	pub fn manager(mut self, manager: M) -> Self {
		self.manager = Some(manager);
		self
	}

	pub fn params(mut self, params: ParserParams) -> Self {
		self.params = params;
		self
	}

	/// Shorthand for `params(ParserParams::new(kind))`.
	pub fn format(mut self, kind: ConfigType) -> Self {
		self.params.kind = kind;
		self
	}

	pub fn parser<Q: ConfigParser>(self, parser: Q) -> ConfigMonitorBuilder<M, Q> {
		ConfigMonitorBuilder {
			key: self.key,
			watcher: self.watcher,
			manager: self.manager,
			parser,
			params: self.params,
		}
	}

	pub fn build(self) -> Result<ConfigMonitor<M, P>, MonitorError> {
		let key = self
			.key
			.ok_or_else(|| MonitorError::Builder("key is required".to_string()))?;
		let watcher = self
			.watcher
			.ok_or_else(|| MonitorError::Builder("watcher is required".to_string()))?;

		let mut monitor = ConfigMonitor::assemble(key, watcher, self.parser)?;
		monitor.manager = self.manager.map(Arc::new);
		monitor.params = self.params;
		Ok(monitor)
	}
}

impl<M: ConfigManager> ConfigMonitor<M> {
	pub fn builder() -> ConfigMonitorBuilder<M> {
		ConfigMonitorBuilder {
			key: None,
			watcher: None,
			manager: None,
			parser: DefaultParser,
			params: ParserParams::default(),
		}
	}

	/// Creates a monitor with the default parser and no manager yet.
	pub fn new(key: impl Into<String>, watcher: Arc<FileWatcher>) -> Result<Self, MonitorError> {
		Self::assemble(key.into(), watcher, DefaultParser)
	}
}

impl<M, P> ConfigMonitor<M, P>
where
	M: ConfigManager,
	P: ConfigParser,
{
	fn assemble(key: String, watcher: Arc<FileWatcher>, parser: P) -> Result<Self, MonitorError> {
		if key.is_empty() {
			return Err(MonitorError::EmptyKey);
		}
		Ok(Self {
			key: Arc::from(key),
			watcher,
			manager: None,
			parser: Arc::new(parser),
			params: ParserParams::default(),
			snapshot: Arc::new(ArcSwapOption::empty()),
			subscribers: Arc::new(Registry::new("config-monitor")),
			stopped: Arc::new(AtomicBool::new(false)),
			state: Mutex::new(MonitorState::Idle),
		})
	}

	/// Installs the manager that slices decoded documents by key.
	pub fn set_manager(&mut self, manager: M) {
		self.manager = Some(Arc::new(manager));
	}

	pub fn set_params(&mut self, params: ParserParams) {
		self.params = params;
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn watcher(&self) -> &Arc<FileWatcher> {
		&self.watcher
	}

	pub fn is_started(&self) -> bool {
		matches!(*self.state.lock(), MonitorState::Started { .. })
	}

	/// Registers with the watcher and synchronously decodes the file once.
	///
	/// Decode or lookup failures during this first pass are only logged; the
	/// snapshot then stays empty until a later write succeeds.
	pub fn start(&self) -> Result<(), MonitorError> {
		let mut state = self.state.lock();
		match *state {
			MonitorState::Idle => {}
			MonitorState::Started { .. } => return Err(MonitorError::AlreadyStarted),
			MonitorState::Stopped => return Err(MonitorError::Stopped),
		}
		let manager = self.manager.clone().ok_or(MonitorError::ManagerNotSet)?;

		let dispatcher = Dispatcher {
			key: Arc::clone(&self.key),
			manager,
			parser: Arc::clone(&self.parser),
			params: self.params,
			snapshot: Arc::clone(&self.snapshot),
			subscribers: Arc::clone(&self.subscribers),
			stopped: Arc::clone(&self.stopped),
		};
		let handle = self
			.watcher
			.register_callback(move |data| dispatcher.on_file_change(data));
		*state = MonitorState::Started { handle };
		drop(state);

		if let Err(e) = self.watcher.call_once_specific(handle) {
			let mut state = self.state.lock();
			if matches!(*state, MonitorState::Started { handle: h } if h == handle) {
				*state = MonitorState::Idle;
			}
			drop(state);
			self.watcher.deregister_callback(handle);
			return Err(e.into());
		}

		tracing::info!(
			key = %self.key,
			path = ?self.watcher.path(),
			format = %self.params.kind,
			"config monitor started"
		);
		Ok(())
	}

	/// Drops every subscriber, then detaches from the watcher. Safe to call repeatedly.
	pub fn stop(&self) {
		let previous = std::mem::replace(&mut *self.state.lock(), MonitorState::Stopped);
		self.stopped.store(true, Ordering::SeqCst);
		let dropped = self.subscribers.clear();

		match previous {
			MonitorState::Started { handle } => {
				self.watcher.deregister_callback(handle);
				tracing::info!(key = %self.key, subscribers = dropped, "config monitor stopped");
			}
			MonitorState::Idle => {
				tracing::debug!(key = %self.key, "config monitor stopped before start");
			}
			MonitorState::Stopped => {}
		}
	}

	/// The latest scoped configuration.
	pub fn config(&self) -> Option<Arc<M::Config>> {
		self.snapshot.load_full()
	}

	/// A detached handle onto the same snapshot as [`config`](Self::config).
	pub fn reader(&self) -> ConfigReader<M::Config> {
		ConfigReader::new(Arc::clone(&self.key), Arc::clone(&self.snapshot))
	}

	/// Decodes `data` with this monitor's parser.
	pub fn decode<T: DeserializeOwned>(&self, kind: ConfigType, data: &[u8]) -> Result<T, DecodeError> {
		self.parser.decode(kind, data)
	}

	/// Adds a subscriber, invoked after every successful snapshot update.
	pub fn register_callback<F>(&self, callback: F) -> SubscriptionHandle
	where
		F: Fn() + Send + Sync + 'static,
	{
		if self.stopped.load(Ordering::SeqCst) {
			tracing::warn!(key = %self.key, "subscriber registered on a stopped monitor will never fire");
		}
		self.subscribers.register(Arc::new(callback))
	}

	/// Removes a subscriber. Unknown handles only produce a warning.
	pub fn deregister_callback(&self, handle: SubscriptionHandle) {
		self.subscribers.deregister(handle);
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}

	/// Invokes one subscriber against the current snapshot, without re-reading the file.
	pub fn call_once_specific(&self, handle: SubscriptionHandle) -> Result<(), MonitorError> {
		if self.stopped.load(Ordering::SeqCst) {
			return Err(MonitorError::Stopped);
		}
		if self.subscribers.dispatch_one(handle, |callback| callback()) {
			Ok(())
		} else {
			Err(MonitorError::CallbackNotFound(handle))
		}
	}
}

impl<M: ConfigManager, P: ConfigParser> Drop for ConfigMonitor<M, P> {
	fn drop(&mut self) {
		self.stop();
	}
}

impl<M, P> std::fmt::Debug for ConfigMonitor<M, P>
where
	M: ConfigManager,
	M::Config: std::fmt::Debug,
	P: ConfigParser,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut s = f.debug_struct("ConfigMonitor");
		s.field("key", &self.key);
		s.field("path", &self.watcher.path());
		s.field("params", &self.params);
		s.field("has_manager", &self.manager.is_some());
		s.field("subscribers", &self.subscribers.len());
		s.field("started", &self.is_started());
		s.field("config", &self.config());
		s.finish_non_exhaustive()
	}
}
