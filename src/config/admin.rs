//! Admin site configuration

use polls_admin::{AdminResult, AdminSite};
use polls_conf::Settings;

use crate::apps::polls;

/// Admin site with every app's model admins registered
pub fn configure_admin(settings: &Settings) -> AdminResult<AdminSite> {
	let mut site = AdminSite::new(settings.admin_title.clone())
		.with_list_per_page(settings.list_per_page);
	polls::admin::register(&mut site)?;
	Ok(site)
}
