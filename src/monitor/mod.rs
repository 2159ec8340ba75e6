/* src/monitor/mod.rs */

//!
//! Scoped configuration monitors.
//!
//! - [`ConfigMonitor`] - decodes a watched file and keeps one scope's snapshot
//! - [`ConfigManager`] - slices the decoded document down to that scope
//! - [`ClientFileManager`] / [`ServerFileManager`] - the built-in layouts

mod error;
mod live;
mod manager;
mod reader;

pub use error::MonitorError;
pub use live::{ConfigMonitor, ConfigMonitorBuilder, MonitorCallback};
pub use manager::{ClientFileConfig, ClientFileManager, ConfigManager, ServerFileConfig, ServerFileManager};
pub use reader::ConfigReader;
