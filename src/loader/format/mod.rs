/* src/loader/format/mod.rs */

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::{DecodeError, Format};
use serde::de::DeserializeOwned;

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::Json;

#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "toml")]
pub use toml::Toml;

#[cfg(feature = "yaml")]
mod yaml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

/// The on-disk format of a watched configuration file.
///
/// Every variant exists regardless of enabled features; decoding a format
/// whose feature is off fails with [`DecodeError::UnsupportedFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConfigType {
	#[default]
	Json,
	Yaml,
	Toml,
}

impl ConfigType {
	/// Short lowercase name, also accepted by [`FromStr`].
	pub fn name(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Yaml => "yaml",
			Self::Toml => "toml",
		}
	}

	/// Picks the format from a file extension (`app.yml` → `Yaml`).
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
		let path = path.as_ref();
		let ext = path
			.extension()
			.and_then(|e| e.to_str())
			.ok_or_else(|| DecodeError::UnsupportedFormat(path.display().to_string()))?;
		ext.parse()
	}

	fn enabled(&self) -> bool {
		match self {
			Self::Json => cfg!(feature = "json"),
			Self::Yaml => cfg!(feature = "yaml"),
			Self::Toml => cfg!(feature = "toml"),
		}
	}
}

impl FromStr for ConfigType {
	type Err = DecodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"yaml" | "yml" => Ok(Self::Yaml),
			"toml" => Ok(Self::Toml),
			other => Err(DecodeError::UnsupportedFormat(other.to_string())),
		}
	}
}

impl fmt::Display for ConfigType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl Format for ConfigType {
	fn extensions(&self) -> &'static [&'static str] {
		match self {
			Self::Json => &["json"],
			Self::Yaml => &["yaml", "yml"],
			Self::Toml => &["toml"],
		}
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, DecodeError> {
		if !self.enabled() {
			return Err(DecodeError::UnsupportedFormat(format!(
				"{} (feature disabled)",
				self.name()
			)));
		}

		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.parse(input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.parse(input),
			#[cfg(feature = "toml")]
			Self::Toml => Toml.parse(input),
			#[allow(unreachable_patterns)]
			_ => Err(DecodeError::UnsupportedFormat(self.name().to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_config_type_from_str() {
		assert_eq!("json".parse::<ConfigType>().unwrap(), ConfigType::Json);
		assert_eq!("YAML".parse::<ConfigType>().unwrap(), ConfigType::Yaml);
		assert_eq!("yml".parse::<ConfigType>().unwrap(), ConfigType::Yaml);
		assert_eq!("toml".parse::<ConfigType>().unwrap(), ConfigType::Toml);
		assert!(matches!(
			"xml".parse::<ConfigType>(),
			Err(DecodeError::UnsupportedFormat(_))
		));
	}

	#[test]
	fn test_config_type_from_path() {
		assert_eq!(
			ConfigType::from_path("/etc/svc/policy.yml").unwrap(),
			ConfigType::Yaml
		);
		assert_eq!(
			ConfigType::from_path("policy.json").unwrap(),
			ConfigType::Json
		);
		assert!(ConfigType::from_path("policy").is_err());
		assert!(ConfigType::from_path("policy.ini").is_err());
	}

	#[test]
	fn test_extensions_round_trip_through_from_str() {
		for kind in [ConfigType::Json, ConfigType::Yaml, ConfigType::Toml] {
			for ext in kind.extensions() {
				assert_eq!(ext.parse::<ConfigType>().unwrap(), kind);
			}
		}
	}
}
