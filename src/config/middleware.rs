use polls_conf::Settings;
use polls_db::DatabaseConnection;
use polls_http::{Extension, LoggingMiddleware, Middleware};
use polls_shortcuts::{ErrorPageMiddleware, TemplateEngine};
use std::sync::Arc;

/// Middleware in request order
///
/// Logging sees the final status, so it sits outside the error pages.
pub fn create_middleware_stack(
	settings: &Settings,
	conn: DatabaseConnection,
	engine: Arc<TemplateEngine>,
) -> Vec<Arc<dyn Middleware>> {
	vec![
		Arc::new(LoggingMiddleware::new()),
		Arc::new(ErrorPageMiddleware::new(Some(engine.clone()), settings.debug)),
		Arc::new(Extension::new(conn)),
		Arc::new(Extension::new(engine)),
	]
}
