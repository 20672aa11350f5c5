//! Custom error page rendering
//!
//! Errors returned by handlers are turned into HTML pages. A template named after
//! the status code (`404.html`, `500.html`) is used when the engine has one;
//! otherwise a built-in page is rendered.

use async_trait::async_trait;
use polls_http::{Error, Handler, Middleware, Request, Response, Result, StatusCode};
use serde_json::json;
use std::sync::Arc;

use crate::template::{TemplateEngine, escape_html};

fn title_and_message(status: StatusCode) -> (&'static str, &'static str) {
	match status.as_u16() {
		400 => (
			"Bad Request",
			"The request could not be understood by the server.",
		),
		404 => ("Not Found", "The requested page could not be found."),
		405 => (
			"Method Not Allowed",
			"The request method is not supported for this resource.",
		),
		500 => (
			"Internal Server Error",
			"An error occurred while processing your request.",
		),
		_ => ("Error", "An error occurred while processing your request."),
	}
}

/// Render an error page for `status`
///
/// `detail` is shown only when given; callers pass it for client errors, or for
/// every error when running with `debug` on.
///
/// # Examples
///
/// ```
/// use polls_http::StatusCode;
/// use polls_shortcuts::render_error_page;
///
/// let response = render_error_page(None, StatusCode::NOT_FOUND, "/polls/9/", None);
/// assert_eq!(response.status, StatusCode::NOT_FOUND);
/// assert!(String::from_utf8_lossy(&response.body).contains("Not Found"));
/// ```
pub fn render_error_page(
	engine: Option<&TemplateEngine>,
	status: StatusCode,
	path: &str,
	detail: Option<&str>,
) -> Response {
	let (title, message) = title_and_message(status);
	let context = json!({
		"status_code": status.as_u16(),
		"title": title,
		"message": message,
		"request_path": path,
		"detail": detail,
	});

	let template_name = format!("{}.html", status.as_u16());
	let rendered = engine
		.filter(|engine| engine.has_template(&template_name))
		.map(|engine| engine.render(&template_name, &context));

	let html = match rendered {
		Some(Ok(html)) => html,
		Some(Err(error)) => {
			tracing::warn!(template = %template_name, %error, "error template failed, using fallback");
			default_error_page(status, title, message, path, detail)
		}
		None => default_error_page(status, title, message, path, detail),
	};

	Response::new(status)
		.with_content_type("text/html; charset=utf-8")
		.with_body(html)
		.with_context(context)
}

fn default_error_page(
	status: StatusCode,
	title: &str,
	message: &str,
	path: &str,
	detail: Option<&str>,
) -> String {
	let detail = detail
		.map(|d| format!("<pre>{}</pre>", escape_html(d)))
		.unwrap_or_default();
	format!(
		"<!DOCTYPE html><html><head><title>{} - {}</title></head><body><h1>{}</h1><p>{}</p><p>Path: {}</p>{}</body></html>",
		status.as_u16(),
		title,
		title,
		message,
		escape_html(path),
		detail
	)
}

/// Converts handler errors into rendered error pages
///
/// Server errors are logged with their detail; the detail reaches the page only
/// in debug mode.
pub struct ErrorPageMiddleware {
	engine: Option<Arc<TemplateEngine>>,
	debug: bool,
}

impl ErrorPageMiddleware {
	pub fn new(engine: Option<Arc<TemplateEngine>>, debug: bool) -> Self {
		Self { engine, debug }
	}
}

#[async_trait]
impl Middleware for ErrorPageMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let path = request.path().to_string();

		let error = match next.handle(request).await {
			Ok(response) => return Ok(response),
			Err(error) => error,
		};

		let status = error.status_code();
		if error.is_server_error() {
			tracing::error!(%path, %error, "unhandled error");
		}

		let detail = match &error {
			Error::BadRequest(detail) => Some(detail.clone()),
			_ if self.debug => Some(error.to_string()),
			_ => None,
		};

		Ok(render_error_page(
			self.engine.as_deref(),
			status,
			&path,
			detail.as_deref(),
		))
	}
}
