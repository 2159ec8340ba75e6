/* src/suite/mod.rs */

//!
//! Ready-made wiring of a [`ConfigMonitor`](crate::monitor::ConfigMonitor)
//! to policy stores, with ordered shutdown.

mod client;
mod hooks;
mod server;

pub use client::{ClientPolicySuite, ClientPolicySuiteBuilder};
pub use hooks::ShutdownHooks;
pub use server::{ServerPolicySuite, ServerPolicySuiteBuilder};
