//! Type-erased model admins
//!
//! [`AdminSite`](crate::AdminSite) stores each registration as an
//! `Arc<dyn AdminEntry>` so models of different types share one registry. The
//! entry does the typed work and hands templates plain JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polls_db::{DatabaseConnection, DatabaseError, FieldKind, FieldMeta, Model, SqlValue};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::changelist::{self, ChangeList};
use crate::error::{AdminError, AdminResult};
use crate::filters::ListParams;
use crate::forms::{BoundField, FormData, INVALID_CHOICE, clean_field, format_value};
use crate::inline::{InlineChange, InlineFormset, InlineModelAdmin, clean_formset, initial_formset};
use crate::model_admin::{ModelAdmin, STR_COLUMN};
use crate::site::AdminUrls;

/// Result of posting an add or change form
#[derive(Debug)]
pub enum Submission {
	Saved { pk: i64, display: String },
	/// The form with its errors, to show again
	Invalid(FormPage),
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldsetContext {
	pub name: Option<String>,
	pub fields: Vec<BoundField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
	pub pk: i64,
	pub display: String,
	pub change_url: String,
	pub delete_url: String,
}

/// Context of the add/change form
#[derive(Debug, Clone, Serialize)]
pub struct FormPage {
	pub add: bool,
	pub object: Option<ObjectSummary>,
	pub fieldsets: Vec<FieldsetContext>,
	pub inlines: Vec<InlineFormset>,
	pub errors: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedGroup {
	pub verbose_name: &'static str,
	pub items: Vec<String>,
}

/// Context of the delete confirmation page
#[derive(Debug, Clone, Serialize)]
pub struct DeletePage {
	pub object: ObjectSummary,
	pub related: Vec<RelatedGroup>,
}

#[async_trait]
pub trait AdminEntry: Send + Sync {
	fn app_label(&self) -> &'static str;

	fn model_name(&self) -> &'static str;

	fn verbose_name(&self) -> &'static str;

	fn verbose_name_plural(&self) -> String;

	/// Validate the configuration against the model's fields
	fn check(&self) -> AdminResult<()>;

	async fn changelist(
		&self,
		conn: &DatabaseConnection,
		params: &ListParams,
		default_per_page: usize,
		now: DateTime<Utc>,
		urls: &AdminUrls,
	) -> AdminResult<ChangeList>;

	/// Unbound form, blank for `None` or showing the stored object
	async fn form(
		&self,
		conn: &DatabaseConnection,
		object_id: Option<i64>,
		urls: &AdminUrls,
	) -> AdminResult<FormPage>;

	async fn submit(
		&self,
		conn: &DatabaseConnection,
		object_id: Option<i64>,
		form: &FormData,
		urls: &AdminUrls,
	) -> AdminResult<Submission>;

	async fn delete_page(
		&self,
		conn: &DatabaseConnection,
		object_id: i64,
		urls: &AdminUrls,
	) -> AdminResult<DeletePage>;

	/// Delete the object (its inline rows go with it), returning its display label
	async fn delete(&self, conn: &DatabaseConnection, object_id: i64) -> AdminResult<String>;
}

pub struct Registered<A> {
	admin: A,
}

impl<A: ModelAdmin> Registered<A> {
	pub fn new(admin: A) -> Self {
		Self { admin }
	}

	fn improperly_configured(message: String) -> AdminError {
		AdminError::ImproperlyConfigured {
			model: format!(
				"{}.{}",
				<A::Model as Model>::app_label(),
				<A::Model as Model>::model_name()
			),
			message,
		}
	}

	/// Fields of the form in fieldset order
	fn form_fields(&self) -> Vec<&'static FieldMeta> {
		self.admin
			.fieldsets()
			.iter()
			.flat_map(|fieldset| fieldset.fields.iter())
			.filter_map(|name| <A::Model as Model>::field(name))
			.collect()
	}

	fn fieldsets_with<F>(&self, mut bind: F) -> Vec<FieldsetContext>
	where
		F: FnMut(&'static FieldMeta) -> BoundField,
	{
		self.admin
			.fieldsets()
			.into_iter()
			.map(|fieldset| FieldsetContext {
				fields: fieldset
					.fields
					.iter()
					.filter_map(|name| <A::Model as Model>::field(name))
					.map(&mut bind)
					.collect(),
				name: fieldset.name,
			})
			.collect()
	}

	async fn load(&self, conn: &DatabaseConnection, pk: i64) -> AdminResult<A::Model> {
		<A::Model as Model>::objects()
			.get(conn, pk)
			.await
			.map_err(|error| match error {
				DatabaseError::DoesNotExist(_) => AdminError::NotFound(format!(
					"{} with ID \"{}\" doesn't exist. Perhaps it was deleted?",
					<A::Model as Model>::verbose_name(),
					pk
				)),
				other => other.into(),
			})
	}

	fn summary(&self, object: &A::Model, urls: &AdminUrls) -> ObjectSummary {
		let app_label = <A::Model as Model>::app_label();
		let model_name = <A::Model as Model>::model_name();
		ObjectSummary {
			pk: object.primary_key(),
			display: object.display(),
			change_url: urls.change(app_label, model_name, object.primary_key()),
			delete_url: urls.delete(app_label, model_name, object.primary_key()),
		}
	}

	fn table() -> &'static str {
		<A::Model as Model>::table_name()
	}
}

#[async_trait]
impl<A: ModelAdmin> AdminEntry for Registered<A> {
	fn app_label(&self) -> &'static str {
		<A::Model as Model>::app_label()
	}

	fn model_name(&self) -> &'static str {
		<A::Model as Model>::model_name()
	}

	fn verbose_name(&self) -> &'static str {
		<A::Model as Model>::verbose_name()
	}

	fn verbose_name_plural(&self) -> String {
		<A::Model as Model>::verbose_name_plural()
	}

	fn check(&self) -> AdminResult<()> {
		let field = |name: &str| <A::Model as Model>::field(name);
		let computed = self.admin.computed_columns();

		for column in self.admin.list_display() {
			if column != STR_COLUMN && field(column).is_none() && !computed.contains(&column) {
				return Err(Self::improperly_configured(format!(
					"list_display refers to '{}', which is not a field or computed column",
					column
				)));
			}
		}

		for name in self.admin.list_filter() {
			if !matches!(field(name), Some(meta) if meta.kind == FieldKind::DateTime) {
				return Err(Self::improperly_configured(format!(
					"list_filter refers to '{}', which is not a date field",
					name
				)));
			}
		}

		for name in self.admin.search_fields() {
			if !matches!(field(name), Some(meta) if matches!(meta.kind, FieldKind::Text { .. })) {
				return Err(Self::improperly_configured(format!(
					"search_fields refers to '{}', which is not a text field",
					name
				)));
			}
		}

		let mut seen: Vec<String> = Vec::new();
		for fieldset in self.admin.fieldsets() {
			for name in fieldset.fields {
				if !field(name.as_str()).is_some_and(FieldMeta::is_editable) {
					return Err(Self::improperly_configured(format!(
						"fieldsets refers to '{}', which is not an editable field",
						name
					)));
				}
				if seen.contains(&name) {
					return Err(Self::improperly_configured(format!(
						"There are duplicate field(s) in fieldsets: '{}'",
						name
					)));
				}
				seen.push(name);
			}
		}

		for term in self.admin.ordering() {
			if field(term.trim_start_matches('-')).is_none() {
				return Err(Self::improperly_configured(format!(
					"ordering refers to '{}', which is not a field",
					term
				)));
			}
		}

		for inline in self.admin.inlines() {
			if inline.fk_name(Self::table()).is_none() {
				return Err(Self::improperly_configured(format!(
					"inline '{}' has no foreign key to '{}'",
					inline.model_name(),
					Self::table()
				)));
			}
		}

		Ok(())
	}

	async fn changelist(
		&self,
		conn: &DatabaseConnection,
		params: &ListParams,
		default_per_page: usize,
		now: DateTime<Utc>,
		urls: &AdminUrls,
	) -> AdminResult<ChangeList> {
		changelist::build(&self.admin, conn, params, default_per_page, now, urls).await
	}

	async fn form(
		&self,
		conn: &DatabaseConnection,
		object_id: Option<i64>,
		urls: &AdminUrls,
	) -> AdminResult<FormPage> {
		let object = match object_id {
			Some(pk) => Some(self.load(conn, pk).await?),
			None => None,
		};

		let fieldsets = match &object {
			Some(object) => {
				let values = serde_json::to_value(object).unwrap_or(Value::Null);
				self.fieldsets_with(|field| {
					let value = format_value(field, values.get(field.name));
					BoundField::new(field, field.name.to_string(), value, None)
				})
			}
			None => self.fieldsets_with(|field| BoundField::initial(field, field.name.to_string())),
		};

		let mut inlines = Vec::new();
		for inline in self.admin.inlines() {
			let existing = match object_id {
				Some(pk) => inline.existing(conn, Self::table(), pk).await?,
				None => Vec::new(),
			};
			inlines.push(initial_formset(inline.as_ref(), Self::table(), &existing));
		}

		Ok(FormPage {
			add: object.is_none(),
			object: object.as_ref().map(|object| self.summary(object, urls)),
			fieldsets,
			inlines,
			errors: false,
		})
	}

	async fn submit(
		&self,
		conn: &DatabaseConnection,
		object_id: Option<i64>,
		form: &FormData,
		urls: &AdminUrls,
	) -> AdminResult<Submission> {
		let object = match object_id {
			Some(pk) => Some(self.load(conn, pk).await?),
			None => None,
		};

		let mut values: Vec<(&'static str, SqlValue)> = Vec::new();
		let mut errors: HashMap<&'static str, String> = HashMap::new();
		for field in self.form_fields() {
			match clean_field(field, form.get(field.name)) {
				Ok(value) => values.push((field.name, value)),
				Err(message) => {
					errors.insert(field.name, message);
				}
			}
		}

		for (name, value) in &values {
			let target = <A::Model as Model>::field(name).map(|field| field.kind);
			if let (Some(FieldKind::ForeignKey { to }), SqlValue::Integer(pk)) = (target, value) {
				if !conn.row_exists(to, *pk).await? {
					errors.insert(*name, INVALID_CHOICE.to_string());
				}
			}
		}

		let inlines: Vec<Arc<dyn InlineModelAdmin>> = self.admin.inlines();
		let mut formsets = Vec::with_capacity(inlines.len());
		let mut inline_changes: Vec<Vec<InlineChange>> = Vec::with_capacity(inlines.len());
		for inline in &inlines {
			let existing_ids: Vec<i64> = match object_id {
				Some(pk) => inline
					.existing(conn, Self::table(), pk)
					.await?
					.into_iter()
					.map(|existing| existing.pk)
					.collect(),
				None => Vec::new(),
			};
			let (formset, changes) = clean_formset(inline.as_ref(), Self::table(), form, &existing_ids);
			formsets.push(formset);
			inline_changes.push(changes);
		}

		if !errors.is_empty() || formsets.iter().any(|formset| !formset.is_valid()) {
			let fieldsets = self.fieldsets_with(|field| {
				let value = form.get(field.name).unwrap_or_default().to_string();
				let error = errors.get(field.name).cloned();
				BoundField::new(field, field.name.to_string(), value, error)
			});
			return Ok(Submission::Invalid(FormPage {
				add: object.is_none(),
				object: object.as_ref().map(|object| self.summary(object, urls)),
				fieldsets,
				inlines: formsets,
				errors: true,
			}));
		}

		let objects = <A::Model as Model>::objects();
		let pk = match object_id {
			Some(pk) => {
				objects.update(conn, pk, &values).await?;
				pk
			}
			None => objects.insert(conn, &values).await?,
		};
		for (inline, changes) in inlines.iter().zip(&inline_changes) {
			inline.apply(conn, Self::table(), pk, changes).await?;
		}

		let saved = self.load(conn, pk).await?;
		Ok(Submission::Saved {
			pk,
			display: saved.display(),
		})
	}

	async fn delete_page(
		&self,
		conn: &DatabaseConnection,
		object_id: i64,
		urls: &AdminUrls,
	) -> AdminResult<DeletePage> {
		let object = self.load(conn, object_id).await?;
		let mut related = Vec::new();
		for inline in self.admin.inlines() {
			let items: Vec<String> = inline
				.existing(conn, Self::table(), object_id)
				.await?
				.into_iter()
				.map(|existing| existing.display)
				.collect();
			if !items.is_empty() {
				related.push(RelatedGroup {
					verbose_name: inline.verbose_name(),
					items,
				});
			}
		}
		Ok(DeletePage {
			object: self.summary(&object, urls),
			related,
		})
	}

	async fn delete(&self, conn: &DatabaseConnection, object_id: i64) -> AdminResult<String> {
		let object = self.load(conn, object_id).await?;
		<A::Model as Model>::objects()
			.delete(conn, object_id)
			.await?;
		Ok(object.display())
	}
}

/// Template context shared by every admin page
pub fn page_context(site_title: &str, urls: &AdminUrls, title: String) -> Value {
	json!({
		"site_title": site_title,
		"site_header": site_title,
		"index_url": urls.index(),
		"title": title,
	})
}
