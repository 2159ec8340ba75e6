/* src/holder/mod.rs */

//!
//! Reference policy stores with lock-free reads.
//!
//! - [`PolicyTable`] - per-method overrides on top of a built-in default
//! - [`PolicyCell`] - a single overridable value, used for the limiter

mod cell;
mod entry;
#[cfg(feature = "events")]
mod event;
mod meta;
mod table;

pub use cell::PolicyCell;
pub use entry::Entry;
#[cfg(feature = "events")]
pub use event::PolicyEvent;
pub use meta::Meta;
pub use table::{DEFAULT_EVENT_CAPACITY, PolicyTable};
