/* src/loader/error.rs */

/// Errors raised while turning file bytes into a document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
	/// The input is not valid for the selected format.
	#[error("{format} parse error: {message}")]
	Parse {
		format: &'static str,
		message: String,
	},

	/// The format is unknown or its cargo feature is disabled.
	#[error("unsupported format: {0}")]
	UnsupportedFormat(String),
}

impl DecodeError {
	pub(crate) fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
		Self::Parse {
			format,
			message: err.to_string(),
		}
	}
}
