//! Admin site: the registry of model admins and the routes serving them

use polls_db::Model;
use polls_http::Method;
use polls_urls::UnifiedRouter;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AdminError, AdminResult};
use crate::model_admin::ModelAdmin;
use crate::registry::{AdminEntry, Registered};
use crate::views::{Action, AdminView};

const DEFAULT_PREFIX: &str = "/admin";
const DEFAULT_LIST_PER_PAGE: usize = 100;

/// Builds the paths of admin pages under a mount prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUrls {
	prefix: String,
}

impl AdminUrls {
	pub fn new(prefix: &str) -> Self {
		let trimmed = prefix.trim_matches('/');
		let prefix = if trimmed.is_empty() {
			String::new()
		} else {
			format!("/{}", trimmed)
		};
		Self { prefix }
	}

	/// The mount prefix, without a trailing slash
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn index(&self) -> String {
		format!("{}/", self.prefix)
	}

	pub fn changelist(&self, app_label: &str, model_name: &str) -> String {
		format!("{}/{}/{}/", self.prefix, app_label, model_name)
	}

	pub fn add(&self, app_label: &str, model_name: &str) -> String {
		format!("{}/{}/{}/add/", self.prefix, app_label, model_name)
	}

	pub fn change(&self, app_label: &str, model_name: &str, pk: i64) -> String {
		format!("{}/{}/{}/{}/change/", self.prefix, app_label, model_name, pk)
	}

	pub fn delete(&self, app_label: &str, model_name: &str, pk: i64) -> String {
		format!("{}/{}/{}/{}/delete/", self.prefix, app_label, model_name, pk)
	}
}

/// A registered model as listed on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
	pub app_label: &'static str,
	pub model_name: &'static str,
	pub verbose_name: &'static str,
	pub verbose_name_plural: String,
	pub changelist_url: String,
	pub add_url: String,
}

/// Models of one app
#[derive(Debug, Clone, Serialize)]
pub struct AppEntry {
	pub app_label: &'static str,
	pub models: Vec<ModelEntry>,
}

/// Admin site, Django's `admin.site`
///
/// Models are registered with a [`ModelAdmin`]; [`AdminSite::urls`] turns the site
/// into a router to be mounted at [`AdminSite::url_prefix`].
///
/// # Examples
///
/// ```
/// use polls_admin::AdminSite;
///
/// let site = AdminSite::new("Site administration").with_url_prefix("/manage/");
/// assert_eq!(site.url_prefix(), "/manage");
/// assert_eq!(site.links().changelist("polls", "question"), "/manage/polls/question/");
/// ```
pub struct AdminSite {
	title: String,
	urls: AdminUrls,
	list_per_page: usize,
	registry: Vec<Arc<dyn AdminEntry>>,
}

impl AdminSite {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			urls: AdminUrls::new(DEFAULT_PREFIX),
			list_per_page: DEFAULT_LIST_PER_PAGE,
			registry: Vec::new(),
		}
	}

	pub fn with_url_prefix(mut self, prefix: &str) -> Self {
		self.urls = AdminUrls::new(prefix);
		self
	}

	/// Page size for models whose admin does not set one
	pub fn with_list_per_page(mut self, list_per_page: usize) -> Self {
		self.list_per_page = list_per_page.max(1);
		self
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn url_prefix(&self) -> &str {
		self.urls.prefix()
	}

	pub fn links(&self) -> &AdminUrls {
		&self.urls
	}

	pub fn list_per_page(&self) -> usize {
		self.list_per_page
	}

	/// Register `admin` for its model
	///
	/// # Errors
	///
	/// [`AdminError::AlreadyRegistered`] when the model already has an admin, and
	/// [`AdminError::ImproperlyConfigured`] when the configuration names fields the
	/// model lacks or uses them where they do not fit.
	pub fn register<A: ModelAdmin>(&mut self, admin: A) -> AdminResult<()> {
		let app_label = <A::Model as Model>::app_label();
		let model_name = <A::Model as Model>::model_name();
		if self.entry(app_label, model_name).is_some() {
			return Err(AdminError::AlreadyRegistered(format!(
				"{}.{}",
				app_label, model_name
			)));
		}

		let entry = Registered::new(admin);
		entry.check()?;
		tracing::debug!(app = app_label, model = model_name, "model registered with admin");
		self.registry.push(Arc::new(entry));
		Ok(())
	}

	pub fn is_registered<M: Model>(&self) -> bool {
		self.entry(M::app_label(), M::model_name()).is_some()
	}

	pub(crate) fn entry(&self, app_label: &str, model_name: &str) -> Option<Arc<dyn AdminEntry>> {
		self.registry
			.iter()
			.find(|entry| entry.app_label() == app_label && entry.model_name() == model_name)
			.cloned()
	}

	/// Registered models grouped by app, apps and models in registration order
	pub fn app_list(&self) -> Vec<AppEntry> {
		let mut apps: Vec<AppEntry> = Vec::new();
		for entry in &self.registry {
			let model = ModelEntry {
				app_label: entry.app_label(),
				model_name: entry.model_name(),
				verbose_name: entry.verbose_name(),
				verbose_name_plural: entry.verbose_name_plural(),
				changelist_url: self.urls.changelist(entry.app_label(), entry.model_name()),
				add_url: self.urls.add(entry.app_label(), entry.model_name()),
			};
			match apps.iter_mut().find(|app| app.app_label == entry.app_label()) {
				Some(app) => app.models.push(model),
				None => apps.push(AppEntry {
					app_label: entry.app_label(),
					models: vec![model],
				}),
			}
		}
		apps
	}

	/// Router of the admin pages, relative to [`AdminSite::url_prefix`], under the
	/// `admin` namespace
	pub fn urls(self) -> UnifiedRouter {
		let site = Arc::new(self);
		let view = |action| AdminView::new(site.clone(), action);
		let read_write = [Method::GET, Method::POST];

		UnifiedRouter::new()
			.with_namespace("admin")
			.path_methods("/", view(Action::Index), "index", &[Method::GET])
			.path_methods(
				"/{app_label}/{model_name}/",
				view(Action::ChangeList),
				"changelist",
				&[Method::GET],
			)
			.path_methods(
				"/{app_label}/{model_name}/add/",
				view(Action::Add),
				"add",
				&read_write,
			)
			.path_methods(
				"/{app_label}/{model_name}/{<int:object_id>}/",
				view(Action::ObjectRedirect),
				"object",
				&[Method::GET],
			)
			.path_methods(
				"/{app_label}/{model_name}/{<int:object_id>}/change/",
				view(Action::Change),
				"change",
				&read_write,
			)
			.path_methods(
				"/{app_label}/{model_name}/{<int:object_id>}/delete/",
				view(Action::Delete),
				"delete",
				&read_write,
			)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/admin", "/admin/")]
	#[case("admin/", "/admin/")]
	#[case("/", "/")]
	fn test_urls_normalize_prefix(#[case] prefix: &str, #[case] index: &str) {
		assert_eq!(AdminUrls::new(prefix).index(), index);
	}

	#[rstest]
	fn test_object_urls() {
		let urls = AdminUrls::new("/admin");

		assert_eq!(urls.add("polls", "choice"), "/admin/polls/choice/add/");
		assert_eq!(urls.change("polls", "choice", 4), "/admin/polls/choice/4/change/");
		assert_eq!(urls.delete("polls", "choice", 4), "/admin/polls/choice/4/delete/");
	}

	#[rstest]
	fn test_urls_are_namespaced() {
		let router = AdminSite::new("Admin").urls();

		assert_eq!(
			router
				.reverse("admin:change", &[("app_label", "polls"), ("model_name", "question"), ("object_id", "3")])
				.unwrap(),
			"/polls/question/3/change/"
		);
	}
}
