/* src/holder/entry.rs */

use std::sync::Arc;

use super::Meta;

/// An installed override and when it was installed.
#[derive(Debug, Clone)]
pub struct Entry<P> {
	pub value: Arc<P>,
	pub meta: Meta,
}
