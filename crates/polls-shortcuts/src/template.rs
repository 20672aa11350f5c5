//! Tera-backed template engine shared through request extensions

use serde_json::Value;
use std::error::Error as _;
use tera::{Context, Tera};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
	#[error("Template '{0}' not found")]
	NotFound(String),

	#[error("Template '{name}' failed to parse: {message}")]
	Parse { name: String, message: String },

	#[error("Template '{name}' failed to render: {message}")]
	Render { name: String, message: String },

	#[error("Template context must be an object: {0}")]
	Context(String),
}

impl From<TemplateError> for polls_http::Error {
	fn from(error: TemplateError) -> Self {
		polls_http::Error::Template(error.to_string())
	}
}

/// Full error chain; Tera keeps the useful part in `source()`
fn describe(error: &tera::Error) -> String {
	let mut message = error.to_string();
	let mut source = error.source();
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}

/// Escape `& < > " '` for HTML output
///
/// ```
/// use polls_shortcuts::escape_html;
///
/// assert_eq!(escape_html("Yes/No <b>?</b>"), "Yes/No &lt;b&gt;?&lt;/b&gt;");
/// assert_eq!(escape_html("it's \"fine\" & done"), "it&#x27;s &quot;fine&quot; &amp; done");
/// ```
pub fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len() + 10);
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

fn with_html_escape(mut tera: Tera) -> Tera {
	tera.set_escape_fn(escape_html);
	tera
}

/// A set of named templates
///
/// Templates whose names end in `.html` are autoescaped with [`escape_html`].
///
/// # Examples
///
/// ```
/// use polls_shortcuts::TemplateEngine;
/// use serde_json::json;
///
/// let mut engine = TemplateEngine::new();
/// engine.add_raw_template("hello.html", "Hello {{ name }}!").unwrap();
///
/// let html = engine.render("hello.html", &json!({ "name": "<b>you</b>" })).unwrap();
/// assert_eq!(html, "Hello &lt;b&gt;you&lt;/b&gt;!");
/// ```
#[derive(Debug)]
pub struct TemplateEngine {
	tera: Tera,
}

impl Default for TemplateEngine {
	fn default() -> Self {
		Self {
			tera: with_html_escape(Tera::default()),
		}
	}
}

impl TemplateEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Load every `*.html` file below `dir`, named by its path relative to `dir`
	pub fn from_dir(dir: &str) -> Result<Self, TemplateError> {
		let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
		let tera = Tera::new(&glob).map_err(|e| TemplateError::Parse {
			name: glob.clone(),
			message: describe(&e),
		})?;
		Ok(Self {
			tera: with_html_escape(tera),
		})
	}

	pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<(), TemplateError> {
		self.tera
			.add_raw_template(name, content)
			.map_err(|e| TemplateError::Parse {
				name: name.to_string(),
				message: describe(&e),
			})
	}

	/// Add several templates at once so they may extend each other
	pub fn add_raw_templates(&mut self, templates: &[(&str, &str)]) -> Result<(), TemplateError> {
		self.tera
			.add_raw_templates(templates.to_vec())
			.map_err(|e| TemplateError::Parse {
				name: templates
					.iter()
					.map(|(name, _)| *name)
					.collect::<Vec<_>>()
					.join(", "),
				message: describe(&e),
			})
	}

	pub fn has_template(&self, name: &str) -> bool {
		self.tera.get_template_names().any(|n| n == name)
	}

	pub fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
		if !self.has_template(name) {
			return Err(TemplateError::NotFound(name.to_string()));
		}
		let context = match context {
			Value::Null => Context::new(),
			other => Context::from_value(other.clone())
				.map_err(|e| TemplateError::Context(describe(&e)))?,
		};
		self.tera
			.render(name, &context)
			.map_err(|e| TemplateError::Render {
				name: name.to_string(),
				message: describe(&e),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_templates_can_extend_each_other() {
		// Arrange
		let mut engine = TemplateEngine::new();
		engine
			.add_raw_templates(&[
				("base.html", "<main>{% block content %}{% endblock %}</main>"),
				(
					"page.html",
					"{% extends \"base.html\" %}{% block content %}{{ title }}{% endblock %}",
				),
			])
			.unwrap();

		// Act
		let html = engine.render("page.html", &json!({ "title": "Polls" })).unwrap();

		// Assert
		assert_eq!(html, "<main>Polls</main>");
	}

	#[rstest]
	#[case("Yes/No or either/or?", "<p>Yes/No or either/or?</p>")]
	#[case("<script>", "<p>&lt;script&gt;</p>")]
	#[case("Tom & Jerry's", "<p>Tom &amp; Jerry&#x27;s</p>")]
	fn test_html_autoescape_keeps_slashes(#[case] text: &str, #[case] expected: &str) {
		// Arrange
		let mut engine = TemplateEngine::new();
		engine.add_raw_template("p.html", "<p>{{ text }}</p>").unwrap();

		// Act
		let html = engine.render("p.html", &json!({ "text": text })).unwrap();

		// Assert
		assert_eq!(html, expected);
	}

	#[rstest]
	fn test_missing_template() {
		let engine = TemplateEngine::new();

		let result = engine.render("nope.html", &Value::Null);

		assert!(matches!(result, Err(TemplateError::NotFound(_))));
	}

	#[rstest]
	fn test_non_object_context_is_rejected() {
		let mut engine = TemplateEngine::new();
		engine.add_raw_template("a.html", "a").unwrap();

		let result = engine.render("a.html", &json!([1, 2]));

		assert!(matches!(result, Err(TemplateError::Context(_))));
	}
}
