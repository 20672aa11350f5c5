//! Admin request handlers

use async_trait::async_trait;
use chrono::Utc;
use polls_db::DatabaseConnection;
use polls_http::{Handler, Method, Request, Response, Result, StatusCode};
use polls_shortcuts::redirect;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::AdminError;
use crate::filters::ListParams;
use crate::forms::FormData;
use crate::registry::{AdminEntry, Submission, page_context};
use crate::site::AdminSite;
use crate::templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Index,
	ChangeList,
	Add,
	/// `/{app}/{model}/{id}/` forwards to the change page
	ObjectRedirect,
	Change,
	Delete,
}

pub struct AdminView {
	site: Arc<AdminSite>,
	action: Action,
}

impl AdminView {
	pub fn new(site: Arc<AdminSite>, action: Action) -> Self {
		Self { site, action }
	}

	fn entry(&self, request: &Request) -> Result<Arc<dyn AdminEntry>> {
		let app_label: String = request.path_param("app_label")?;
		let model_name: String = request.path_param("model_name")?;
		self.site
			.entry(&app_label, &model_name)
			.ok_or_else(|| {
				AdminError::NotFound(format!("No admin for {}.{}", app_label, model_name)).into()
			})
	}

	fn context(&self, title: String, entry: Option<&dyn AdminEntry>) -> Value {
		let urls = self.site.links();
		let mut context = page_context(self.site.title(), urls, title);
		if let Some(entry) = entry {
			context["model"] = json!({
				"app_label": entry.app_label(),
				"model_name": entry.model_name(),
				"verbose_name": entry.verbose_name(),
				"verbose_name_plural": entry.verbose_name_plural(),
				"changelist_url": urls.changelist(entry.app_label(), entry.model_name()),
				"add_url": urls.add(entry.app_label(), entry.model_name()),
			});
		}
		context
	}

	fn changelist_url(&self, entry: &dyn AdminEntry) -> String {
		self.site
			.links()
			.changelist(entry.app_label(), entry.model_name())
	}

	fn index(&self) -> Result<Response> {
		let mut context = self.context(self.site.title().to_string(), None);
		context["app_list"] = json!(self.site.app_list());
		Ok(templates::render("admin/index.html", context)?)
	}

	async fn changelist(&self, request: &Request, conn: &DatabaseConnection) -> Result<Response> {
		let entry = self.entry(request)?;
		let params: ListParams = request.query_params().into_iter().collect();
		let changelist = entry
			.changelist(
				conn,
				&params,
				self.site.list_per_page(),
				Utc::now(),
				self.site.links(),
			)
			.await?;

		let title = format!("Select {} to change", entry.verbose_name());
		let mut context = self.context(title, Some(entry.as_ref()));
		context["cl"] = json!(changelist);
		Ok(templates::render("admin/change_list.html", context)?)
	}

	async fn change_form(
		&self,
		request: &Request,
		conn: &DatabaseConnection,
		object_id: Option<i64>,
	) -> Result<Response> {
		let entry = self.entry(request)?;
		let verb = if object_id.is_some() { "Change" } else { "Add" };
		let title = format!("{} {}", verb, entry.verbose_name());

		if request.method != Method::POST {
			let page = entry.form(conn, object_id, self.site.links()).await?;
			let mut context = self.context(title, Some(entry.as_ref()));
			context["form"] = json!(page);
			return Ok(templates::render("admin/change_form.html", context)?);
		}

		let form = FormData::parse(request.body())?;
		match entry
			.submit(conn, object_id, &form, self.site.links())
			.await?
		{
			Submission::Saved { pk, display: label } => {
				tracing::info!(
					model = entry.model_name(),
					pk,
					object = %label,
					"{}",
					if object_id.is_some() { "changed" } else { "added" }
				);
				let links = self.site.links();
				let location = if form.contains("_continue") {
					links.change(entry.app_label(), entry.model_name(), pk)
				} else if form.contains("_addanother") {
					links.add(entry.app_label(), entry.model_name())
				} else {
					self.changelist_url(entry.as_ref())
				};
				Ok(redirect(location))
			}
			Submission::Invalid(page) => {
				let mut context = self.context(title, Some(entry.as_ref()));
				context["form"] = json!(page);
				Ok(templates::render("admin/change_form.html", context)?
					.with_status(StatusCode::BAD_REQUEST))
			}
		}
	}

	async fn delete(
		&self,
		request: &Request,
		conn: &DatabaseConnection,
		object_id: i64,
	) -> Result<Response> {
		let entry = self.entry(request)?;

		if request.method != Method::POST {
			let page = entry.delete_page(conn, object_id, self.site.links()).await?;
			let mut context = self.context("Are you sure?".to_string(), Some(entry.as_ref()));
			context["delete"] = json!(page);
			return Ok(templates::render("admin/delete_confirmation.html", context)?);
		}

		let label = entry.delete(conn, object_id).await?;
		tracing::info!(model = entry.model_name(), pk = object_id, object = %label, "deleted");
		Ok(redirect(self.changelist_url(entry.as_ref())))
	}
}

#[async_trait]
impl Handler for AdminView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let conn = request.extension::<DatabaseConnection>()?;
		match self.action {
			Action::Index => self.index(),
			Action::ChangeList => self.changelist(&request, &conn).await,
			Action::Add => self.change_form(&request, &conn, None).await,
			Action::ObjectRedirect => {
				let entry = self.entry(&request)?;
				let object_id: i64 = request.path_param("object_id")?;
				Ok(redirect(self.site.links().change(
					entry.app_label(),
					entry.model_name(),
					object_id,
				)))
			}
			Action::Change => {
				let object_id: i64 = request.path_param("object_id")?;
				self.change_form(&request, &conn, Some(object_id)).await
			}
			Action::Delete => {
				let object_id: i64 = request.path_param("object_id")?;
				self.delete(&request, &conn, object_id).await
			}
		}
	}
}
