/* src/lib.rs */

//!
//! Live, per-method RPC policy overrides driven by a watched configuration file.
//!
//! The crate is layered bottom-up:
//!
//! - **signal**: [`FileWatcher`] watches one file and fans its contents out to
//!   registered callbacks, on demand or on every debounced change.
//! - **loader**: format-agnostic decoding of those bytes (`json`, `yaml`, `toml`).
//! - **monitor**: [`ConfigMonitor`] keeps the latest snapshot of one scope
//!   (a destination service or a server) and notifies its subscribers.
//! - **policy**: policy types and the synchronization protocol that applies
//!   per-method overrides and resets methods that disappear from the file.
//! - **holder**: reference stores ([`PolicyTable`], [`PolicyCell`]) with
//!   lock-free reads.
//! - **suite**: ready-made client and server wiring with ordered shutdown.
//!
//! ## Feature Flags
//!
//! - `json`, `yaml`, `toml` (default): decoders for each file format.
//! - `events`: change broadcasting from [`PolicyTable`].
//! - `full`: enables all features.
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

pub mod holder;
pub mod loader;
pub mod monitor;
pub mod policy;
pub mod signal;
pub mod suite;

pub use holder::{PolicyCell, PolicyTable};
pub use loader::{ConfigParser, ConfigType, DecodeError, DefaultParser, ParserParams};
pub use monitor::{ClientFileManager, ConfigManager, ConfigMonitor, MonitorError, ServerFileManager};
pub use policy::{LimiterStore, Policy, PolicyStore};
pub use signal::{FileWatcher, SignalError, SubscriptionHandle, WatchConfig};
pub use suite::{ClientPolicySuite, ServerPolicySuite, ShutdownHooks};
