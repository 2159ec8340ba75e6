/* src/monitor/error.rs */

use thiserror::Error;

use crate::loader::DecodeError;
use crate::signal::{SignalError, SubscriptionHandle};

/// Errors that can occur while building or running a config monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
	#[error("Builder error: {0}")]
	Builder(String),

	#[error("Scope key must not be empty")]
	EmptyKey,

	#[error("Config manager must be set before start()")]
	ManagerNotSet,

	#[error("Monitor already started")]
	AlreadyStarted,

	#[error("Monitor has been stopped")]
	Stopped,

	#[error("Subscriber not found: {0}")]
	CallbackNotFound(SubscriptionHandle),

	#[error("Signal error: {0}")]
	Signal(#[from] SignalError),

	#[error("Decode error: {0}")]
	Decode(#[from] DecodeError),
}
