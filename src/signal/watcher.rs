/* src/signal/watcher.rs */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{RecursiveMode, Watcher as NotifyWatcher};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::worker::run_event_loop;
use super::{Registry, Result, SignalError, SubscriptionHandle, WatchConfig};

/// Callback invoked with the full contents of the watched file.
pub type FileCallback = dyn Fn(&[u8]) + Send + Sync;

/// State shared between the watcher handle and its event loop.
pub(crate) struct Shared {
	pub(crate) path: PathBuf,
	pub(crate) callbacks: Registry<FileCallback>,
	pub(crate) stopped: AtomicBool,
	/// Held across read and fan-out so passes deliver file contents in read order.
	pub(crate) pass: Mutex<()>,
}

enum Lifecycle {
	Idle,
	Watching {
		stop_tx: oneshot::Sender<()>,
		task: JoinHandle<()>,
	},
	Stopped,
}

/// Watches a single file and fans its contents out to registered callbacks.
///
/// Create one per file and share it behind an `Arc`. Callbacks may be
/// registered before or after [`start_watching`](Self::start_watching);
/// [`call_once_all`](Self::call_once_all) primes them without waiting for a
/// filesystem event.
pub struct FileWatcher {
	shared: Arc<Shared>,
	config: WatchConfig,
	lifecycle: Mutex<Lifecycle>,
}

impl FileWatcher {
	/// Binds a watcher to `path` with the default [`WatchConfig`].
	pub fn new(path: impl AsRef<Path>) -> Result<Self> {
		Self::with_config(path, WatchConfig::default())
	}

	/// Binds a watcher to `path`. Fails if the file does not exist.
	pub fn with_config(path: impl AsRef<Path>, config: WatchConfig) -> Result<Self> {
		let path = resolve(path.as_ref())?;
		Ok(Self {
			shared: Arc::new(Shared {
				path,
				callbacks: Registry::new("file-watcher"),
				stopped: AtomicBool::new(false),
				pass: Mutex::new(()),
			}),
			config,
			lifecycle: Mutex::new(Lifecycle::Idle),
		})
	}

	/// The watched file, with its parent directory canonicalized.
	pub fn path(&self) -> &Path {
		&self.shared.path
	}

	/// Adds a callback; it receives the file bytes on every change.
	pub fn register_callback<F>(&self, callback: F) -> SubscriptionHandle
	where
		F: Fn(&[u8]) + Send + Sync + 'static,
	{
		self.shared.callbacks.register(Arc::new(callback))
	}

	/// Removes a callback. Unknown handles only produce a warning.
	pub fn deregister_callback(&self, handle: SubscriptionHandle) {
		self.shared.callbacks.deregister(handle);
	}

	pub fn callback_count(&self) -> usize {
		self.shared.callbacks.len()
	}

	/// Reads the file once and invokes every registered callback with it.
	///
	/// Passes are serialized per watcher, so a later call always delivers
	/// contents read after those of an earlier one. Must not be called from
	/// inside one of this watcher's callbacks.
	pub fn call_once_all(&self) -> Result<()> {
		self.shared.call_once_all()
	}

	/// Reads the file once and invokes only the callback behind `handle`.
	pub fn call_once_specific(&self, handle: SubscriptionHandle) -> Result<()> {
		self.shared.call_once_specific(handle)
	}

	/// Starts the background event loop.
	///
	/// Must be called from within a Tokio runtime. A watcher can be started
	/// at most once and cannot be restarted after [`stop_watching`](Self::stop_watching).
	pub fn start_watching(&self) -> Result<()> {
		let mut lifecycle = self.lifecycle.lock();
		match *lifecycle {
			Lifecycle::Idle => {}
			Lifecycle::Watching { .. } => return Err(SignalError::AlreadyStarted),
			Lifecycle::Stopped => return Err(SignalError::Stopped),
		}

		let runtime = tokio::runtime::Handle::try_current().map_err(|_| SignalError::NoRuntime)?;

		let path = &self.shared.path;
		if !path.exists() {
			return Err(SignalError::FileNotFound(path.clone()));
		}
		// `resolve` always produces `<canonical parent>/<file name>`.
		let watch_dir = path
			.parent()
			.ok_or_else(|| SignalError::FileNotFound(path.clone()))?;

		let (raw_tx, raw_rx) = mpsc::channel(100);
		let mut os_watcher =
			notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
				let _ = raw_tx.blocking_send(res);
			})?;
		os_watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

		let (stop_tx, stop_rx) = oneshot::channel();
		let task = runtime.spawn(run_event_loop(
			Arc::clone(&self.shared),
			os_watcher,
			raw_rx,
			stop_rx,
			self.config.clone(),
		));

		*lifecycle = Lifecycle::Watching { stop_tx, task };
		tracing::info!(path = ?path, "started watching config file");
		Ok(())
	}

	/// Stops the event loop and releases the OS watch. Safe to call repeatedly.
	pub fn stop_watching(&self) {
		let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);
		self.shared.stopped.store(true, Ordering::SeqCst);

		match previous {
			Lifecycle::Watching { stop_tx, task } => {
				// The loop may already have exited on its own (file removed).
				let _ = stop_tx.send(());
				drop(task);
				tracing::info!(path = ?self.shared.path, "stopped watching config file");
			}
			Lifecycle::Idle => {
				tracing::debug!(path = ?self.shared.path, "watcher stopped before it was started");
			}
			Lifecycle::Stopped => {
				tracing::debug!(path = ?self.shared.path, "watcher already stopped");
			}
		}
	}

	/// Returns true while the event loop is running.
	pub fn is_watching(&self) -> bool {
		match &*self.lifecycle.lock() {
			Lifecycle::Watching { task, .. } => {
				!task.is_finished() && !self.shared.stopped.load(Ordering::SeqCst)
			}
			_ => false,
		}
	}
}

impl Drop for FileWatcher {
	fn drop(&mut self) {
		self.stop_watching();
	}
}

impl std::fmt::Debug for FileWatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileWatcher")
			.field("path", &self.shared.path)
			.field("config", &self.config)
			.field("callbacks", &self.shared.callbacks)
			.field("watching", &self.is_watching())
			.finish()
	}
}

impl Shared {
	fn read(&self) -> Result<Vec<u8>> {
		std::fs::read(&self.path).map_err(|source| SignalError::Io {
			path: self.path.clone(),
			source,
		})
	}

	pub(crate) fn call_once_all(&self) -> Result<()> {
		if self.stopped.load(Ordering::SeqCst) {
			return Err(SignalError::Stopped);
		}
		let _pass = self.pass.lock();
		let data = self.read()?;
		let completed = self.callbacks.dispatch_all(|callback| callback(data.as_slice()));
		tracing::debug!(path = ?self.path, completed, "dispatched config file contents");
		Ok(())
	}

	pub(crate) fn call_once_specific(&self, handle: SubscriptionHandle) -> Result<()> {
		if self.stopped.load(Ordering::SeqCst) {
			return Err(SignalError::Stopped);
		}
		if !self.callbacks.contains(handle) {
			return Err(SignalError::CallbackNotFound(handle));
		}
		let _pass = self.pass.lock();
		let data = self.read()?;
		if self.callbacks.dispatch_one(handle, |callback| callback(data.as_slice())) {
			Ok(())
		} else {
			Err(SignalError::CallbackNotFound(handle))
		}
	}
}

fn resolve(path: &Path) -> Result<PathBuf> {
	if !path.is_file() {
		return Err(SignalError::FileNotFound(path.to_path_buf()));
	}
	let file_name = path
		.file_name()
		.ok_or_else(|| SignalError::FileNotFound(path.to_path_buf()))?;
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	let parent = std::fs::canonicalize(parent).map_err(|source| SignalError::Io {
		path: parent.to_path_buf(),
		source,
	})?;
	Ok(parent.join(file_name))
}
