/* src/loader/format/json.rs */

use super::super::{DecodeError, Format};
use serde::de::DeserializeOwned;

/// JSON format parser using `serde_json`.
pub struct Json;

impl Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError> {
		serde_json::from_slice(input).map_err(|e| DecodeError::parse("json", e))
	}
}
