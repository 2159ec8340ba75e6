/* src/holder/event.rs */

use std::sync::Arc;

use super::Meta;

/// Change notifications broadcast by a [`PolicyTable`](super::PolicyTable).
#[derive(Debug, Clone)]
pub enum PolicyEvent<P> {
	/// `method` now has an override; `old` is the override it replaced.
	Overridden {
		method: String,
		old: Option<Arc<P>>,
		new: Arc<P>,
		meta: Meta,
	},
	/// The override for `method` was dropped and the default applies again.
	Reset { method: String, old: Arc<P> },
}
