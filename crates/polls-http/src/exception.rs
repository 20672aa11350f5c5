//! Error type shared by handlers, middleware and routers.

use hyper::StatusCode;

/// Errors a handler can return instead of a response
///
/// Each variant maps onto an HTTP status through [`Error::status_code`]; the error
/// page middleware and the server use that mapping to turn a failed request into
/// a response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	#[error("Template error: {0}")]
	Template(String),

	#[error("Database error: {0}")]
	Database(String),

	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code this error is reported with
	///
	/// # Examples
	///
	/// ```
	/// use polls_http::Error;
	/// use hyper::StatusCode;
	///
	/// let error = Error::NotFound("/polls/9/".to_string());
	/// assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::BadRequest(_) => StatusCode::BAD_REQUEST,
			Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			Error::Template(_) | Error::Database(_) | Error::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	/// Whether the error reflects a server-side fault rather than a bad request
	pub fn is_server_error(&self) -> bool {
		self.status_code().is_server_error()
	}
}

pub type Result<T> = std::result::Result<T, Error>;
