use polls_shortcuts::{TemplateEngine, TemplateError};

const TEMPLATES: &[(&str, &str)] = &[
	("polls/index.html", include_str!("../../templates/polls/index.html")),
	("polls/detail.html", include_str!("../../templates/polls/detail.html")),
	("404.html", include_str!("../../templates/404.html")),
	("500.html", include_str!("../../templates/500.html")),
];

/// Engine holding the project templates, compiled into the binary
pub fn template_engine() -> Result<TemplateEngine, TemplateError> {
	let mut engine = TemplateEngine::new();
	engine.add_raw_templates(TEMPLATES)?;
	Ok(engine)
}
