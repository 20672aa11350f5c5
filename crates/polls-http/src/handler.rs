use async_trait::async_trait;
use std::future::Future;

use crate::exception::Result;
use crate::{Request, Response};

/// Handler trait for processing requests.
///
/// Every view, router and middleware chain implements this trait.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed; the error is turned
	/// into a response further up the chain.
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Adapter turning an `async fn(Request) -> Result<Response>` into a [`Handler`]
pub struct FnHandler<F> {
	func: F,
}

/// Wrap a view function as a handler
///
/// # Examples
///
/// ```
/// use polls_http::{Handler, Request, Response, Result, handler_fn};
///
/// async fn index(_request: Request) -> Result<Response> {
///     Ok(Response::ok().with_body("index"))
/// }
///
/// let handler = handler_fn(index);
/// # let _: &dyn Handler = &handler;
/// ```
pub fn handler_fn<F, Fut>(func: F) -> FnHandler<F>
where
	F: Fn(Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	FnHandler { func }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
	F: Fn(Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		(self.func)(request).await
	}
}
