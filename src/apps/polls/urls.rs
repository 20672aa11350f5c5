use polls_http::{Method, handler_fn};
use polls_urls::UnifiedRouter;

use super::views;

/// Routes of the polls app, relative to where the project mounts them
pub fn url_patterns() -> UnifiedRouter {
	UnifiedRouter::new()
		.with_namespace("polls")
		.path_methods("/", handler_fn(views::index), "index", &[Method::GET])
		.path_methods(
			"/{<int:question_id>}/",
			handler_fn(views::detail),
			"detail",
			&[Method::GET],
		)
		.path_methods(
			"/{<int:question_id>}/results/",
			handler_fn(views::results),
			"results",
			&[Method::GET],
		)
		.path_methods(
			"/{<int:question_id>}/vote/",
			handler_fn(views::vote),
			"vote",
			&[Method::GET, Method::POST],
		)
}
