//! Built-in admin templates

use once_cell::sync::Lazy;
use polls_http::Response;
use polls_shortcuts::{TemplateEngine, render_html};
use serde_json::Value;

use crate::error::{AdminError, AdminResult};

const TEMPLATES: &[(&str, &str)] = &[
	("admin/base.html", include_str!("../templates/admin/base.html")),
	("admin/macros.html", include_str!("../templates/admin/macros.html")),
	("admin/index.html", include_str!("../templates/admin/index.html")),
	(
		"admin/change_list.html",
		include_str!("../templates/admin/change_list.html"),
	),
	(
		"admin/change_form.html",
		include_str!("../templates/admin/change_form.html"),
	),
	(
		"admin/delete_confirmation.html",
		include_str!("../templates/admin/delete_confirmation.html"),
	),
];

static ENGINE: Lazy<Result<TemplateEngine, String>> = Lazy::new(|| {
	let mut engine = TemplateEngine::new();
	engine
		.add_raw_templates(TEMPLATES)
		.map_err(|error| error.to_string())?;
	Ok(engine)
});

/// Render an admin page, keeping `context` on the response
pub fn render(name: &str, context: Value) -> AdminResult<Response> {
	let engine = ENGINE.as_ref().map_err(|error| AdminError::Template(error.clone()))?;
	let html = engine.render(name, &context)?;
	Ok(render_html(html).with_context(context))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_builtin_templates_compile() {
		// Act
		let engine = ENGINE.as_ref();

		// Assert
		let engine = engine.unwrap();
		for (name, _) in TEMPLATES {
			assert!(engine.has_template(name), "{} missing", name);
		}
	}

	#[rstest]
	fn test_render_keeps_context() {
		// Arrange
		let context = json!({
			"site_title": "Polls admin",
			"site_header": "Polls admin",
			"index_url": "/admin/",
			"title": "Polls admin",
			"app_list": [],
		});

		// Act
		let response = render("admin/index.html", context.clone()).unwrap();

		// Assert
		let body = String::from_utf8(response.body.to_vec()).unwrap();
		assert!(body.contains("Site administration"));
		assert_eq!(response.context, Some(context));
	}
}
