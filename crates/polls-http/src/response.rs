use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION};
use hyper::{HeaderMap, StatusCode};
use serde_json::Value;

use crate::exception::Error;

/// A status, headers and body, plus the template context the body came from
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Template context the body was rendered from, kept so tests can inspect
	/// what a view handed to its template. Never sent over the wire.
	pub context: Option<Value>,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			context: None,
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	/// Bare 500 for a lookup the database could not answer
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// 301 to the slash-terminated form of a path, as the router answers `/polls`
	pub fn permanent_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::MOVED_PERMANENTLY).with_location(location.as_ref())
	}

	/// 302, sent after a successful admin save or delete
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	/// ```
	/// use polls_http::Response;
	///
	/// let response = Response::ok().with_body("You are voting on question 3.");
	/// assert_eq!(&response.body[..], b"You are voting on question 3.");
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a header; invalid names or values are ignored
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_content_type(mut self, content_type: &'static str) -> Self {
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
		self
	}

	pub fn with_context(mut self, context: Value) -> Self {
		self.context = Some(context);
		self
	}

	fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(LOCATION, value);
		}
		self
	}

	pub fn location(&self) -> Option<&str> {
		self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}
}

/// Plain-text fallback used when no error page renderer is installed
impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let body = match &error {
			Error::NotFound(_) => "Not Found".to_string(),
			Error::MethodNotAllowed(_) => "Method Not Allowed".to_string(),
			Error::BadRequest(detail) => format!("Bad Request: {}", detail),
			_ => "Internal Server Error".to_string(),
		};
		Response::new(error.status_code())
			.with_content_type("text/plain; charset=utf-8")
			.with_body(body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_error_conversion_keeps_status() {
		let response: Response = Error::NotFound("/nowhere/".into()).into();

		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
	}

	#[rstest]
	fn test_internal_error_body_hides_detail() {
		let response: Response = Error::Database("password=secret".into()).into();

		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!String::from_utf8_lossy(&response.body).contains("secret"));
	}

	#[rstest]
	#[case(Response::temporary_redirect("/admin/polls/question/"), StatusCode::FOUND)]
	#[case(Response::permanent_redirect("/admin/polls/question/"), StatusCode::MOVED_PERMANENTLY)]
	fn test_redirect_sets_location(#[case] response: Response, #[case] status: StatusCode) {
		assert_eq!(response.status, status);
		assert_eq!(response.location(), Some("/admin/polls/question/"));
	}
}
