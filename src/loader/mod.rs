/* src/loader/mod.rs */

//!
//! Format-agnostic decoding of raw file bytes into typed documents.

pub mod error;
pub mod format;
mod parser;

pub use error::DecodeError;
pub use format::ConfigType;
pub use parser::{ConfigParser, DefaultParser, ParserParams};

use serde::de::DeserializeOwned;

/// Abstract format parser that converts bytes into a structured object.
pub trait Format: Send + Sync {
	/// List of supported extensions or identifiers.
	fn extensions(&self) -> &'static [&'static str];

	/// Parse the raw bytes into the target type.
	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError>;
}
