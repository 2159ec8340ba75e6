/* src/holder/meta.rs */

use std::time::Instant;

/// Bookkeeping attached to every override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
	/// Store-wide counter value at the time of the write, starting at 1.
	pub version: u64,
	pub updated_at: Instant,
}

impl Meta {
	pub(crate) fn now(version: u64) -> Self {
		Self {
			version,
			updated_at: Instant::now(),
		}
	}
}
