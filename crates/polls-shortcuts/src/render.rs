//! Template rendering shortcut functions
//!
//! Provides convenient functions for rendering templates and creating HTTP responses.

use polls_http::{Error, Request, Response, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::template::TemplateEngine;

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

/// Render a template with context into an HTTP 200 response, like Django's `render()`
///
/// The engine is taken from the request's `Arc<TemplateEngine>` extension. The
/// context is kept on the response so tests can inspect it.
///
/// # Examples
///
/// ```
/// use polls_http::{Request, Response, Result};
/// use polls_shortcuts::{TemplateEngine, render};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let mut engine = TemplateEngine::new();
/// engine.add_raw_template("greet.html", "Hi {{ name }}").unwrap();
///
/// let request = Request::builder().build().unwrap();
/// request.extensions.insert(Arc::new(engine));
///
/// let response = render(&request, "greet.html", json!({ "name": "Ada" })).unwrap();
/// assert_eq!(response.body, "Hi Ada");
/// assert_eq!(response.context.unwrap()["name"], "Ada");
/// ```
pub fn render(request: &Request, template_name: &str, context: Value) -> Result<Response> {
	let engine = request.extension::<Arc<TemplateEngine>>()?;
	let html = engine.render(template_name, &context)?;
	Ok(render_html(html).with_context(context))
}

pub fn render_html(html: impl Into<String>) -> Response {
	Response::ok().with_content_type(HTML).with_body(html.into())
}

/// Plain text HTTP 200 response, Django's `HttpResponse("...")`
pub fn render_text(text: impl Into<String>) -> Response {
	Response::ok().with_content_type(TEXT).with_body(text.into())
}

/// Serialize data as JSON into an HTTP 200 response
pub fn render_json<T: Serialize>(data: &T) -> Result<Response> {
	let body = serde_json::to_string(data).map_err(|e| Error::Internal(e.to_string()))?;
	Ok(Response::ok()
		.with_content_type("application/json")
		.with_body(body))
}

/// HTTP 302 redirect
pub fn redirect(location: impl AsRef<str>) -> Response {
	Response::temporary_redirect(location)
}

#[cfg(test)]
mod tests {
	use super::*;
	use polls_http::StatusCode;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_render_without_engine_is_internal_error() {
		let request = Request::builder().build().unwrap();

		let result = render(&request, "any.html", json!({}));

		assert!(matches!(result, Err(Error::Internal(_))));
	}

	#[rstest]
	fn test_render_text_sets_content_type() {
		let response = render_text("You are voting on question 1.");

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.content_type(), Some(TEXT));
		assert_eq!(response.body, "You are voting on question 1.");
	}

	#[rstest]
	fn test_render_json() {
		let response = render_json(&json!({ "ok": true })).unwrap();

		assert_eq!(response.content_type(), Some("application/json"));
		assert_eq!(response.body, "{\"ok\":true}");
	}
}
