use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::exception::{Error, Result};
use crate::extensions::Extensions;

/// HTTP Request representation
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	body: Bytes,
	/// Parameters captured by the URL pattern that matched this request
	pub path_params: HashMap<String, String>,
	pub remote_addr: Option<SocketAddr>,
	pub extensions: Extensions,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			remote_addr: None,
			extensions: Extensions::new(),
		}
	}

	/// Start building a request
	///
	/// # Examples
	///
	/// ```
	/// use polls_http::{Method, Request};
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/polls/?page=2")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/polls/");
	/// assert_eq!(request.query_params().get("page").map(String::as_str), Some("2"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn body(&self) -> &Bytes {
		&self.body
	}

	/// URL-decoded query parameters; the last occurrence of a key wins
	pub fn query_params(&self) -> HashMap<String, String> {
		self.uri
			.query()
			.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
			.map(|pairs| pairs.into_iter().collect())
			.unwrap_or_default()
	}

	/// Parse an `application/x-www-form-urlencoded` body into `T`
	pub fn form<T: DeserializeOwned>(&self) -> Result<T> {
		serde_urlencoded::from_bytes(&self.body)
			.map_err(|e| Error::BadRequest(format!("Invalid form body: {}", e)))
	}

	/// Fetch and parse a captured path parameter
	///
	/// # Examples
	///
	/// ```
	/// use polls_http::Request;
	///
	/// let mut request = Request::builder().uri("/polls/7/").build().unwrap();
	/// request.path_params.insert("question_id".into(), "7".into());
	///
	/// let id: i64 = request.path_param("question_id").unwrap();
	/// assert_eq!(id, 7);
	/// assert!(request.path_param::<i64>("missing").is_err());
	/// ```
	pub fn path_param<T: FromStr>(&self, name: &str) -> Result<T> {
		let raw = self
			.path_params
			.get(name)
			.ok_or_else(|| Error::BadRequest(format!("Missing path parameter '{}'", name)))?;
		raw.parse::<T>()
			.map_err(|_| Error::NotFound(format!("Invalid value '{}' for '{}'", raw, name)))
	}

	/// Fetch a resource placed on the request by middleware
	pub fn extension<T>(&self) -> Result<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!(
				"Request extension {} is not configured",
				std::any::type_name::<T>()
			))
		})
	}
}

/// Builder for [`Request`]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	/// Add a header; invalid names or values are ignored
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			hyper::header::HeaderName::from_str(name),
			hyper::header::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn build(self) -> Result<Request> {
		let uri = self
			.uri
			.parse::<Uri>()
			.map_err(|e| Error::BadRequest(format!("Invalid URI '{}': {}", self.uri, e)))?;
		Ok(Request::new(
			self.method,
			uri,
			self.version,
			self.headers,
			self.body,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde::Deserialize;

	#[derive(Debug, Deserialize, PartialEq)]
	struct VoteForm {
		choice: i64,
	}

	#[rstest]
	fn test_form_body_parsing() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/polls/1/vote/")
			.header("content-type", "application/x-www-form-urlencoded")
			.body("choice=3")
			.build()
			.unwrap();

		// Act
		let form: VoteForm = request.form().unwrap();

		// Assert
		assert_eq!(form, VoteForm { choice: 3 });
	}

	#[rstest]
	fn test_query_params_are_decoded() {
		let request = Request::builder()
			.uri("/admin/polls/question/?q=what%27s+up")
			.build()
			.unwrap();

		assert_eq!(
			request.query_params().get("q").map(String::as_str),
			Some("what's up")
		);
	}

	#[rstest]
	fn test_unparsable_path_param_is_not_found() {
		let mut request = Request::builder().build().unwrap();
		request
			.path_params
			.insert("question_id".into(), "abc".into());

		let result = request.path_param::<i64>("question_id");

		assert!(matches!(result, Err(Error::NotFound(_))));
	}

	#[rstest]
	fn test_missing_extension_is_internal_error() {
		let request = Request::builder().build().unwrap();

		let result = request.extension::<String>();

		assert!(matches!(result, Err(Error::Internal(_))));
	}

	#[rstest]
	fn test_invalid_uri_is_rejected() {
		let result = Request::builder().uri("http://[::1").build();

		assert!(matches!(result, Err(Error::BadRequest(_))));
	}
}
