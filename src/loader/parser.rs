/* src/loader/parser.rs */

use serde::de::DeserializeOwned;

use super::{ConfigType, DecodeError, Format};

/// Pluggable decoder used by a config monitor.
pub trait ConfigParser: Send + Sync + 'static {
	/// Decodes `data` of the given format into `T`.
	fn decode<T: DeserializeOwned>(&self, kind: ConfigType, data: &[u8]) -> Result<T, DecodeError>;
}

/// Decodes through the built-in `serde` formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl ConfigParser for DefaultParser {
	fn decode<T: DeserializeOwned>(&self, kind: ConfigType, data: &[u8]) -> Result<T, DecodeError> {
		kind.parse(data)
	}
}

/// Parameters handed to the parser on every decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserParams {
	/// Format of the watched file.
	pub kind: ConfigType,
}

impl ParserParams {
	pub fn new(kind: ConfigType) -> Self {
		Self { kind }
	}
}
