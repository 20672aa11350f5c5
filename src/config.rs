//! Project configuration: templates, admin site, middleware and the URL tree

pub mod admin;
pub mod middleware;
pub mod templates;
pub mod urls;

use polls_admin::AdminError;
use polls_conf::Settings;
use polls_db::DatabaseConnection;
use polls_http::{Handler, MiddlewareChain};
use polls_shortcuts::TemplateError;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Admin configuration failed: {0}")]
	Admin(#[from] AdminError),

	#[error("Project templates failed to load: {0}")]
	Template(#[from] TemplateError),
}

/// The whole site as one handler: middleware stack around the project router
pub fn build_application(
	settings: &Settings,
	conn: DatabaseConnection,
) -> Result<Arc<dyn Handler>, ConfigError> {
	let engine = Arc::new(templates::template_engine()?);
	let site = admin::configure_admin(settings)?;
	let router = urls::routes(site);

	let chain = middleware::create_middleware_stack(settings, conn, engine)
		.into_iter()
		.fold(MiddlewareChain::new(Arc::new(router)), |chain, middleware| {
			chain.with_middleware(middleware)
		});
	Ok(Arc::new(chain))
}
