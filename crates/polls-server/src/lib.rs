//! HTTP server for polls-site
//!
//! Serves any [`polls_http::Handler`] over HTTP/1.1 with one tokio task per
//! connection. [`ShutdownCoordinator`] stops the accept loop and gives in-flight
//! connections a bounded time to finish.

pub mod http;
pub mod shutdown;

pub use http::{HttpServer, ServerError, serve_with_shutdown};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
