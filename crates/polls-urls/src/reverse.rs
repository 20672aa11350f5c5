//! Named URL reversal, after Django's `django.urls.reverse()`

use crate::pattern::FillError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReverseError {
	#[error("Reverse for '{0}' not found")]
	NoReverseMatch(String),

	#[error("Reverse for '{route}' is missing parameter '{param}'")]
	MissingParameter { route: String, param: String },

	#[error("Reverse for '{route}' got invalid value '{value}' for parameter '{param}'")]
	InvalidParameter {
		route: String,
		param: String,
		value: String,
	},
}

pub type ReverseResult<T> = std::result::Result<T, ReverseError>;

impl ReverseError {
	pub(crate) fn from_fill(route: &str, error: FillError) -> Self {
		match error {
			FillError::Missing(param) => Self::MissingParameter {
				route: route.to_string(),
				param,
			},
			FillError::Invalid { name, value } => Self::InvalidParameter {
				route: route.to_string(),
				param: name,
				value,
			},
		}
	}
}

impl From<ReverseError> for polls_http::Error {
	fn from(error: ReverseError) -> Self {
		polls_http::Error::Internal(error.to_string())
	}
}
