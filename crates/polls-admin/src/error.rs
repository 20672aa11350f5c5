use polls_db::DatabaseError;
use polls_shortcuts::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
	#[error("The model {0} is already registered")]
	AlreadyRegistered(String),

	/// A registration names fields the model does not have, or uses them wrongly
	#[error("Improperly configured admin for {model}: {message}")]
	ImproperlyConfigured { model: String, message: String },

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	BadRequest(String),

	#[error(transparent)]
	Database(#[from] DatabaseError),

	#[error("Admin template error: {0}")]
	Template(String),
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

impl From<TemplateError> for AdminError {
	fn from(error: TemplateError) -> Self {
		AdminError::Template(error.to_string())
	}
}

impl From<AdminError> for polls_http::Error {
	fn from(error: AdminError) -> Self {
		match error {
			AdminError::NotFound(message) => polls_http::Error::NotFound(message),
			AdminError::BadRequest(message) => polls_http::Error::BadRequest(message),
			AdminError::Database(error) => error.into(),
			AdminError::Template(message) => polls_http::Error::Template(message),
			other => polls_http::Error::Internal(other.to_string()),
		}
	}
}
