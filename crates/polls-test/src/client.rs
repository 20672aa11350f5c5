//! In-process test client

use polls_http::{Handler, Method, Request, Response};
use std::sync::Arc;

use crate::response::TestResponse;

/// Sends requests straight to a handler without a socket
///
/// Handler errors are converted to responses the way the server converts them,
/// so a test always gets a [`TestResponse`] back.
///
/// # Examples
///
/// ```
/// use polls_http::{Request, Response, Result, handler_fn};
/// use polls_test::TestClient;
/// use std::sync::Arc;
///
/// async fn index(_request: Request) -> Result<Response> {
///     Ok(Response::ok().with_body("Hello"))
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let client = TestClient::new(Arc::new(handler_fn(index)));
/// let response = client.get("/").await;
/// assert_eq!(response.text(), "Hello");
/// # });
/// ```
#[derive(Clone)]
pub struct TestClient {
	handler: Arc<dyn Handler>,
}

impl TestClient {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	pub async fn request(&self, request: Request) -> TestResponse {
		self.handler
			.handle(request)
			.await
			.unwrap_or_else(Response::from)
			.into()
	}

	async fn send(&self, method: Method, path: &str, body: Option<String>) -> TestResponse {
		let mut builder = Request::builder().method(method).uri(path);
		if let Some(body) = body {
			builder = builder
				.header("content-type", "application/x-www-form-urlencoded")
				.body(body);
		}
		let request = builder
			.build()
			.unwrap_or_else(|e| panic!("Invalid test request path '{}': {}", path, e));
		self.request(request).await
	}

	pub async fn get(&self, path: &str) -> TestResponse {
		self.send(Method::GET, path, None).await
	}

	pub async fn head(&self, path: &str) -> TestResponse {
		self.send(Method::HEAD, path, None).await
	}

	pub async fn delete(&self, path: &str) -> TestResponse {
		self.send(Method::DELETE, path, None).await
	}

	/// POST an `application/x-www-form-urlencoded` body
	pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
		let body = serde_urlencoded::to_string(form)
			.unwrap_or_else(|e| panic!("Cannot encode form {:?}: {}", form, e));
		self.send(Method::POST, path, Some(body)).await
	}
}
