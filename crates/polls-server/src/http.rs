use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::StatusCode;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use polls_http::{Handler, Request, Response};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::shutdown::ShutdownCoordinator;

const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		source: std::io::Error,
	},

	#[error("Failed to accept connection: {0}")]
	Accept(std::io::Error),
}

pub struct HttpServer {
	handler: Arc<dyn Handler>,
	max_body_size: usize,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			max_body_size: DEFAULT_MAX_BODY_SIZE,
		}
	}

	pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
		self.max_body_size = max_body_size;
		self
	}

	/// Bind `addr` and serve until the coordinator signals shutdown
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| ServerError::Bind { addr, source })?;
		self.serve(listener, coordinator).await
	}

	/// Serve connections from an already bound listener
	///
	/// On shutdown the accept loop stops, open connections finish their current
	/// request, and the call returns once they have closed or the coordinator's
	/// timeout has passed.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		if let Ok(local) = listener.local_addr() {
			tracing::info!(address = %local, "server listening on http://{}", local);
		}

		let mut shutdown_rx = coordinator.subscribe();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = result.map_err(ServerError::Accept)?;
					let service = RequestService {
						handler: self.handler.clone(),
						remote_addr,
						max_body_size: self.max_body_size,
					};
					let guard = coordinator.track();
					let conn_shutdown = coordinator.subscribe();

					tokio::task::spawn(async move {
						if let Err(error) = handle_connection(stream, service, conn_shutdown).await {
							tracing::debug!(%remote_addr, %error, "connection closed with error");
						}
						drop(guard);
					});
				}
				_ = shutdown_rx.recv() => {
					tracing::info!("shutdown signal received, no longer accepting connections");
					break;
				}
			}
		}

		drop(listener);
		if coordinator.wait_for_connections().await {
			tracing::info!("all connections closed");
		} else {
			tracing::warn!(
				open = coordinator.active_connections(),
				"shutdown timeout reached with connections still open"
			);
		}
		Ok(())
	}
}

async fn handle_connection(
	stream: TcpStream,
	service: RequestService,
	mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), hyper::Error> {
	let io = TokioIo::new(stream);
	let conn = http1::Builder::new().serve_connection(io, service);
	tokio::pin!(conn);

	tokio::select! {
		result = conn.as_mut() => result,
		_ = shutdown.recv() => {
			conn.as_mut().graceful_shutdown();
			conn.await
		}
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	max_body_size: usize,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Infallible;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;
		let max_body_size = self.max_body_size;

		Box::pin(async move {
			let (parts, body) = req.into_parts();

			let body_bytes = match Limited::new(body, max_body_size).collect().await {
				Ok(collected) => collected.to_bytes(),
				Err(_) => {
					return Ok(into_hyper(
						Response::new(StatusCode::PAYLOAD_TOO_LARGE).with_body("Request body too large"),
					));
				}
			};

			let mut request = Request::new(
				parts.method,
				parts.uri,
				parts.version,
				parts.headers,
				body_bytes,
			);
			request.remote_addr = Some(remote_addr);

			let response = handler
				.handle(request)
				.await
				.unwrap_or_else(Response::from);

			Ok(into_hyper(response))
		})
	}
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
	let mut hyper_response = hyper::Response::new(Full::new(response.body));
	*hyper_response.status_mut() = response.status;
	*hyper_response.headers_mut() = response.headers;
	hyper_response
}

/// Serve `handler` on `addr` until `coordinator` is shut down
pub async fn serve_with_shutdown(
	addr: SocketAddr,
	handler: Arc<dyn Handler>,
	coordinator: ShutdownCoordinator,
) -> Result<(), ServerError> {
	HttpServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use polls_http::{Error, handler_fn};
	use rstest::rstest;
	use std::time::Duration;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};

	async fn hello(request: Request) -> polls_http::Result<Response> {
		match request.path() {
			"/" => Ok(Response::ok().with_body("hello")),
			other => Err(Error::NotFound(other.to_string())),
		}
	}

	async fn exchange(addr: SocketAddr, raw: &str) -> String {
		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream.write_all(raw.as_bytes()).await.unwrap();
		let mut buf = Vec::new();
		stream.read_to_end(&mut buf).await.unwrap();
		String::from_utf8_lossy(&buf).into_owned()
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_requests_and_shuts_down() {
		// Arrange
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));
		let server = HttpServer::new(Arc::new(handler_fn(hello)));
		let running = tokio::spawn(server.serve(listener, coordinator.clone()));

		// Act
		let ok = exchange(addr, "GET / HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
		let missing =
			exchange(addr, "GET /nope HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
		coordinator.shutdown();
		let result = tokio::time::timeout(Duration::from_secs(5), running).await;

		// Assert
		assert!(ok.starts_with("HTTP/1.1 200 OK"));
		assert!(ok.ends_with("hello"));
		assert!(missing.starts_with("HTTP/1.1 404 Not Found"));
		assert!(result.unwrap().unwrap().is_ok());
	}
}
