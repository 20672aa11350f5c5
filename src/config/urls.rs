//! URL configuration of the project
//!
//! `/polls/` serves the polls app and the admin lives under its site prefix
//! (`/admin/` by default).

use polls_admin::AdminSite;
use polls_urls::UnifiedRouter;

use crate::apps::polls;

pub fn routes(site: AdminSite) -> UnifiedRouter {
	let admin_prefix = format!("{}/", site.url_prefix());
	UnifiedRouter::new()
		.mount("/polls/", polls::urls::url_patterns())
		.mount(&admin_prefix, site.urls())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("polls:index", &[], "/polls/")]
	#[case("polls:detail", &[("question_id", "3")], "/polls/3/")]
	#[case("admin:index", &[], "/admin/")]
	#[case("admin:changelist", &[("app_label", "polls"), ("model_name", "question")], "/admin/polls/question/")]
	fn test_project_reverse(
		#[case] name: &str,
		#[case] params: &[(&str, &str)],
		#[case] expected: &str,
	) {
		// Arrange
		let router = routes(AdminSite::new("Polls administration"));

		// Act
		let path = router.reverse(name, params).unwrap();

		// Assert
		assert_eq!(path, expected);
	}
}
