/* src/signal/worker.rs */

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use notify::RecommendedWatcher;
use notify::event::{ModifyKind, RenameMode};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use super::watcher::Shared;
use super::{EventKind, SignalError, WatchConfig};

struct DebounceState {
	last_seen: Instant,
	kind: EventKind,
}

/// Runs until stopped, the file is removed, or the notify channel closes.
///
/// Owns the OS watch handle; it is released when the loop returns.
pub(crate) async fn run_event_loop(
	shared: Arc<Shared>,
	_os_watcher: RecommendedWatcher,
	mut raw_rx: mpsc::Receiver<notify::Result<notify::Event>>,
	mut stop_rx: oneshot::Receiver<()>,
	config: WatchConfig,
) {
	let mut pending: Option<DebounceState> = None;

	loop {
		let deadline = pending.as_ref().map(|state| state.last_seen + config.debounce);

		tokio::select! {
			_ = &mut stop_rx => break,
			maybe_event = raw_rx.recv() => {
				match maybe_event {
					Some(Ok(event)) => handle_raw_event(event, &mut pending, &shared.path, &config),
					Some(Err(e)) => tracing::warn!(path = ?shared.path, error = %e, "notify error"),
					None => break,
				}
			}
			_ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
				let Some(state) = pending.take() else {
					continue;
				};
				match state.kind {
					EventKind::Create | EventKind::Modify => dispatch(&shared).await,
					EventKind::Remove => {
						tracing::warn!(path = ?shared.path, "config file removed, watcher stops");
						shared.stopped.store(true, Ordering::SeqCst);
						break;
					}
				}
			}
		}
	}

	tracing::debug!(path = ?shared.path, "config watch loop exited");
}

fn handle_raw_event(
	event: notify::Event,
	pending: &mut Option<DebounceState>,
	path: &Path,
	config: &WatchConfig,
) {
	use notify::EventKind as NK;
	let kind = match event.kind {
		NK::Create(_) => EventKind::Create,
		// Moving the file away looks like a rename-from on its own path.
		NK::Modify(ModifyKind::Name(RenameMode::From)) => EventKind::Remove,
		NK::Modify(_) => EventKind::Modify,
		NK::Remove(_) => EventKind::Remove,
		_ => return,
	};

	if !event.paths.iter().any(|p| p == path) {
		return;
	}

	let now = Instant::now();
	match pending {
		None => {
			*pending = Some(DebounceState {
				last_seen: now,
				kind,
			});
		}
		Some(state) => {
			state.last_seen = now;
			if !config.coalesce {
				state.kind = kind;
				return;
			}

			match (state.kind, kind) {
				(EventKind::Create, EventKind::Modify) => { /* Keep Create */ }
				(EventKind::Create | EventKind::Modify, EventKind::Remove) => {
					state.kind = EventKind::Remove;
				}
				(EventKind::Remove, EventKind::Modify) => {
					// Ignore noise
				}
				_ => {
					// Remove followed by Create is an atomic save.
					state.kind = kind;
				}
			}
		}
	}
}

async fn dispatch(shared: &Arc<Shared>) {
	let shared = Arc::clone(shared);
	let path = shared.path.clone();
	match tokio::task::spawn_blocking(move || shared.call_once_all()).await {
		Ok(Ok(())) => {}
		Ok(Err(SignalError::Stopped)) => {
			tracing::debug!(path = ?path, "change ignored, watcher stopped");
		}
		Ok(Err(e)) => tracing::warn!(path = ?path, error = %e, "failed to dispatch config change"),
		Err(e) => tracing::error!(path = ?path, error = %e, "config dispatch task failed"),
	}
}
