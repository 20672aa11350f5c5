//! Shortcut functions for views
//!
//! Django-style helpers: render a template into a response, fetch an object or
//! fail with 404, and turn handler errors into rendered error pages.

pub mod error_pages;
pub mod get_or_404;
pub mod render;
pub mod template;

pub use error_pages::{ErrorPageMiddleware, render_error_page};
pub use get_or_404::{GetError, get_list_or_404, get_object_or_404, get_or_404_response};
pub use render::{redirect, render, render_html, render_json, render_text};
pub use template::{TemplateEngine, TemplateError, escape_html};
