//! Middleware trait and the chain that composes middleware around a handler.
//!
//! Middleware wraps handlers to add cross-cutting concerns:
//!
//! ```rust
//! use polls_http::{Handler, Middleware, Request, Response, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Noop;
//!
//! #[async_trait]
//! impl Middleware for Noop {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
//!         next.handle(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::exception::Result;
use crate::{Handler, Request, Response};

#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// A handler wrapped by an ordered list of middleware
///
/// Middleware run in the order they were added: the first one added sees the
/// request first and the response last.
pub struct MiddlewareChain {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	fn compose(&self) -> Arc<dyn Handler> {
		self.middlewares
			.iter()
			.rev()
			.fold(self.handler.clone(), |next, middleware| {
				Arc::new(Next {
					middleware: middleware.clone(),
					next,
				})
			})
	}
}

struct Next {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Next {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.compose().handle(request).await
	}
}

/// Logs one line per request with method, path, status and latency
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let method = request.method.clone();
		let path = request.path().to_string();
		let started = Instant::now();

		let result = next.handle(request).await;
		let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

		match &result {
			Ok(response) if response.status.is_server_error() => {
				tracing::error!(%method, %path, status = response.status.as_u16(), elapsed_ms, "request failed");
			}
			Ok(response) => {
				tracing::info!(%method, %path, status = response.status.as_u16(), elapsed_ms, "request");
			}
			Err(error) if error.is_server_error() => {
				tracing::error!(%method, %path, %error, elapsed_ms, "request failed");
			}
			Err(error) => {
				tracing::info!(%method, %path, status = error.status_code().as_u16(), elapsed_ms, "request");
			}
		}

		result
	}
}

/// Places a clone of a shared resource on every request
///
/// # Examples
///
/// ```
/// use polls_http::{Extension, MiddlewareChain, Request, Response, Result, handler_fn};
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct SiteName(&'static str);
///
/// async fn view(request: Request) -> Result<Response> {
///     let site = request.extension::<SiteName>()?;
///     Ok(Response::ok().with_body(site.0))
/// }
///
/// let chain = MiddlewareChain::new(Arc::new(handler_fn(view)))
///     .with_middleware(Arc::new(Extension::new(SiteName("polls"))));
/// ```
pub struct Extension<T> {
	value: T,
}

impl<T> Extension<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new(value: T) -> Self {
		Self { value }
	}
}

#[async_trait]
impl<T> Middleware for Extension<T>
where
	T: Clone + Send + Sync + 'static,
{
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		request.extensions.insert(self.value.clone());
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler_fn;
	use rstest::rstest;
	use std::sync::Mutex;

	struct Recorder {
		label: &'static str,
		log: Arc<Mutex<Vec<String>>>,
	}

	#[async_trait]
	impl Middleware for Recorder {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			self.log.lock().unwrap().push(format!("{}:before", self.label));
			let response = next.handle(request).await;
			self.log.lock().unwrap().push(format!("{}:after", self.label));
			response
		}
	}

	async fn ok_view(_request: Request) -> Result<Response> {
		Ok(Response::ok())
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_runs_in_registration_order() {
		// Arrange
		let log = Arc::new(Mutex::new(Vec::new()));
		let chain = MiddlewareChain::new(Arc::new(handler_fn(ok_view)))
			.with_middleware(Arc::new(Recorder {
				label: "outer",
				log: log.clone(),
			}))
			.with_middleware(Arc::new(Recorder {
				label: "inner",
				log: log.clone(),
			}));

		// Act
		chain
			.handle(Request::builder().build().unwrap())
			.await
			.unwrap();

		// Assert
		assert_eq!(
			*log.lock().unwrap(),
			vec!["outer:before", "inner:before", "inner:after", "outer:after"]
		);
	}

	#[derive(Clone)]
	struct Greeting(String);

	async fn greet(request: Request) -> Result<Response> {
		let greeting = request.extension::<Greeting>()?;
		Ok(Response::ok().with_body(greeting.0))
	}

	#[rstest]
	#[tokio::test]
	async fn test_extension_reaches_view() {
		let chain = MiddlewareChain::new(Arc::new(handler_fn(greet)))
			.with_middleware(Arc::new(LoggingMiddleware::new()))
			.with_middleware(Arc::new(Extension::new(Greeting("hi".into()))));

		let response = chain
			.handle(Request::builder().build().unwrap())
			.await
			.unwrap();

		assert_eq!(response.body, "hi");
	}
}
