//! Test response wrapper with assertion helpers

use bytes::Bytes;
use polls_http::{HeaderMap, Response, StatusCode};
use serde_json::Value;

/// Test response wrapper
///
/// Besides status, headers and body it keeps the template context the view
/// rendered with, like `response.context` in Django's test client.
pub struct TestResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Bytes,
	context: Option<Value>,
}

impl From<Response> for TestResponse {
	fn from(response: Response) -> Self {
		Self {
			status: response.status,
			headers: response.headers,
			body: response.body,
			context: response.context,
		}
	}
}

impl TestResponse {
	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	pub fn body(&self) -> &Bytes {
		&self.body
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.header("content-type")
	}

	pub fn location(&self) -> Option<&str> {
		self.header("location")
	}

	pub fn context(&self) -> Option<&Value> {
		self.context.as_ref()
	}

	/// One key of the template context
	///
	/// # Panics
	///
	/// Panics when the response was not rendered from a template or the key is absent.
	pub fn context_value(&self, key: &str) -> &Value {
		let context = self
			.context
			.as_ref()
			.unwrap_or_else(|| panic!("Response has no template context. Body: {}", self.text()));
		context
			.get(key)
			.unwrap_or_else(|| panic!("Template context has no key '{}': {}", key, context))
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	pub fn is_client_error(&self) -> bool {
		self.status.is_client_error()
	}

	pub fn is_server_error(&self) -> bool {
		self.status.is_server_error()
	}

	/// Django's `assertContains`: status 200 and the text appears in the body
	pub fn assert_contains(&self, text: &str) -> &Self {
		self.assert_status(StatusCode::OK);
		crate::assertions::assert_contains(&self.text(), text);
		self
	}

	pub fn assert_not_contains(&self, text: &str) -> &Self {
		crate::assertions::assert_not_contains(&self.text(), text);
		self
	}

	/// Assert a 301/302 redirect to `expected`
	pub fn assert_redirects(&self, expected: &str) -> &Self {
		assert!(
			self.status.is_redirection(),
			"Expected a redirect, got {}. Body: {}",
			self.status,
			self.text()
		);
		assert_eq!(self.location(), Some(expected), "Redirect target differs");
		self
	}
}

/// Extension trait for Response assertions
pub trait ResponseExt {
	/// Assert status code
	fn assert_status(&self, expected: StatusCode) -> &Self;

	fn assert_ok(&self) -> &Self;
	fn assert_bad_request(&self) -> &Self;
	fn assert_not_found(&self) -> &Self;
	fn assert_method_not_allowed(&self) -> &Self;
}

impl ResponseExt for TestResponse {
	fn assert_status(&self, expected: StatusCode) -> &Self {
		assert_eq!(
			self.status,
			expected,
			"Expected status {}, got {}. Body: {}",
			expected,
			self.status,
			self.text()
		);
		self
	}

	fn assert_ok(&self) -> &Self {
		self.assert_status(StatusCode::OK)
	}

	fn assert_bad_request(&self) -> &Self {
		self.assert_status(StatusCode::BAD_REQUEST)
	}

	fn assert_not_found(&self) -> &Self {
		self.assert_status(StatusCode::NOT_FOUND)
	}

	fn assert_method_not_allowed(&self) -> &Self {
		self.assert_status(StatusCode::METHOD_NOT_ALLOWED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_context_value() {
		let response: TestResponse = Response::ok()
			.with_body("x")
			.with_context(json!({ "latest_question_list": [] }))
			.into();

		assert_eq!(response.context_value("latest_question_list"), &json!([]));
	}

	#[rstest]
	#[should_panic(expected = "Expected status 200 OK, got 404 Not Found")]
	fn test_assert_contains_requires_ok() {
		let response: TestResponse = Response::not_found().with_body("Not Found").into();

		response.assert_contains("Not Found");
	}
}
