//! # polls-http
//!
//! HTTP primitives shared by every layer of the polls site: the [`Request`] and
//! [`Response`] types, the [`Handler`] and [`Middleware`] traits, and the error type
//! handlers return.
//!
//! ## Example
//!
//! ```rust
//! use polls_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body("Hello"))
//!     }
//! }
//! ```

pub mod exception;
pub mod extensions;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;

pub use exception::{Error, Result};
pub use extensions::Extensions;
pub use handler::{FnHandler, Handler, handler_fn};
pub use middleware::{Extension, LoggingMiddleware, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;

pub use hyper::{HeaderMap, Method, StatusCode};
