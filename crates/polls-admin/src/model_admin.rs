//! Model admin configuration and trait
//!
//! This module defines how models are displayed and edited in the admin.

use polls_db::Model;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::inline::InlineModelAdmin;

/// `list_display` entry showing the object's display label
pub const STR_COLUMN: &str = "__str__";

/// A group of fields on the change form, optionally titled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fieldset {
	pub name: Option<String>,
	pub fields: Vec<String>,
}

impl Fieldset {
	pub fn unnamed<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: None,
			fields: fields.into_iter().map(Into::into).collect(),
		}
	}

	pub fn named<I, S>(name: impl Into<String>, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: Some(name.into()),
			fields: fields.into_iter().map(Into::into).collect(),
		}
	}
}

/// Trait for configuring model administration
///
/// Implement this trait to customize how a model is listed and edited. Every
/// method has a default, so an empty implementation gives Django's plain
/// `admin.site.register(Model)` behaviour.
pub trait ModelAdmin: Send + Sync + 'static {
	type Model: Model;

	/// Columns of the change list: field names, computed columns or [`STR_COLUMN`]
	fn list_display(&self) -> Vec<&str> {
		vec![STR_COLUMN]
	}

	/// Timestamp fields offered as sidebar filters
	fn list_filter(&self) -> Vec<&str> {
		vec![]
	}

	/// Text fields searched (case-insensitively) by the `q` parameter
	fn search_fields(&self) -> Vec<&str> {
		vec![]
	}

	/// Layout of the change form; by default one untitled group of every editable field
	fn fieldsets(&self) -> Vec<Fieldset> {
		vec![Fieldset::unnamed(
			<Self::Model as Model>::fields()
				.iter()
				.filter(|field| field.is_editable())
				.map(|field| field.name),
		)]
	}

	/// Related models edited on the same page
	fn inlines(&self) -> Vec<Arc<dyn InlineModelAdmin>> {
		vec![]
	}

	/// Ordering for list view (prefix with "-" for descending)
	fn ordering(&self) -> Vec<&str> {
		vec!["-id"]
	}

	/// Number of items per page (None = use site default)
	fn list_per_page(&self) -> Option<usize> {
		None
	}

	/// Names of columns computed from an object rather than read from a field
	fn computed_columns(&self) -> Vec<&str> {
		vec![]
	}

	fn computed_value(&self, _column: &str, _object: &Self::Model) -> Option<Value> {
		None
	}

	/// Heading of a computed column
	fn column_label(&self, column: &str) -> String {
		column.replace('_', " ")
	}

	/// Whether a computed column is rendered as a yes/no icon
	fn is_boolean_column(&self, _column: &str) -> bool {
		false
	}
}

enum Compute<M> {
	Value(fn(&M) -> Value),
	Boolean(fn(&M) -> bool),
}

/// A column computed from an object, Django's `@admin.display` method
pub struct ComputedColumn<M> {
	pub name: &'static str,
	pub label: &'static str,
	compute: Compute<M>,
}

impl<M> ComputedColumn<M> {
	pub fn is_boolean(&self) -> bool {
		matches!(self.compute, Compute::Boolean(_))
	}

	pub fn value(&self, object: &M) -> Value {
		match self.compute {
			Compute::Value(compute) => compute(object),
			Compute::Boolean(compute) => Value::Bool(compute(object)),
		}
	}
}

/// Configuration-based model admin implementation
///
/// Provides a simple way to configure model admin without implementing the trait.
///
/// # Examples
///
/// ```
/// use polls_admin::{Fieldset, ModelAdmin, ModelAdminConfig};
/// # use polls_db::{FieldKind, FieldMeta, Model};
/// # use serde::Serialize;
/// # use sqlx::{FromRow, Row, sqlite::SqliteRow};
/// # #[derive(Serialize)]
/// # struct Entry { id: i64, title: String }
/// # impl<'r> FromRow<'r, SqliteRow> for Entry {
/// #     fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
/// #         Ok(Self { id: row.try_get("id")?, title: row.try_get("title")? })
/// #     }
/// # }
/// # const FIELDS: &[FieldMeta] = &[
/// #     FieldMeta::new("id", "ID", FieldKind::AutoId),
/// #     FieldMeta::new("title", "title", FieldKind::Text { max_length: 100 }),
/// # ];
/// # impl Model for Entry {
/// #     fn table_name() -> &'static str { "blog_entry" }
/// #     fn app_label() -> &'static str { "blog" }
/// #     fn model_name() -> &'static str { "entry" }
/// #     fn fields() -> &'static [FieldMeta] { FIELDS }
/// #     fn primary_key(&self) -> i64 { self.id }
/// # }
///
/// let admin = ModelAdminConfig::<Entry>::new()
///     .with_list_display(&["title", "is_long"])
///     .with_search_fields(&["title"])
///     .with_fieldsets(vec![Fieldset::unnamed(["title"])])
///     .with_boolean_column("is_long", "Long title?", |entry| entry.title.len() > 40);
///
/// assert_eq!(admin.list_display(), vec!["title", "is_long"]);
/// assert!(admin.is_boolean_column("is_long"));
/// ```
pub struct ModelAdminConfig<M> {
	list_display: Vec<String>,
	list_filter: Vec<String>,
	search_fields: Vec<String>,
	fieldsets: Option<Vec<Fieldset>>,
	inlines: Vec<Arc<dyn InlineModelAdmin>>,
	ordering: Option<Vec<String>>,
	list_per_page: Option<usize>,
	computed: Vec<ComputedColumn<M>>,
	_model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for ModelAdminConfig<M> {
	fn default() -> Self {
		Self::new()
	}
}

fn owned(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

impl<M: Model> ModelAdminConfig<M> {
	pub fn new() -> Self {
		Self {
			list_display: vec![STR_COLUMN.to_string()],
			list_filter: vec![],
			search_fields: vec![],
			fieldsets: None,
			inlines: vec![],
			ordering: None,
			list_per_page: None,
			computed: vec![],
			_model: PhantomData,
		}
	}

	pub fn with_list_display(mut self, columns: &[&str]) -> Self {
		self.list_display = owned(columns);
		self
	}

	pub fn with_list_filter(mut self, fields: &[&str]) -> Self {
		self.list_filter = owned(fields);
		self
	}

	pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
		self.search_fields = owned(fields);
		self
	}

	pub fn with_fieldsets(mut self, fieldsets: Vec<Fieldset>) -> Self {
		self.fieldsets = Some(fieldsets);
		self
	}

	pub fn with_inline<I: InlineModelAdmin + 'static>(mut self, inline: I) -> Self {
		self.inlines.push(Arc::new(inline));
		self
	}

	pub fn with_ordering(mut self, ordering: &[&str]) -> Self {
		self.ordering = Some(owned(ordering));
		self
	}

	pub fn with_list_per_page(mut self, list_per_page: usize) -> Self {
		self.list_per_page = Some(list_per_page);
		self
	}

	pub fn with_computed_column(
		mut self,
		name: &'static str,
		label: &'static str,
		compute: fn(&M) -> Value,
	) -> Self {
		self.computed.push(ComputedColumn {
			name,
			label,
			compute: Compute::Value(compute),
		});
		self
	}

	/// Computed yes/no column, Django's `@admin.display(boolean=True)`
	pub fn with_boolean_column(
		mut self,
		name: &'static str,
		label: &'static str,
		compute: fn(&M) -> bool,
	) -> Self {
		self.computed.push(ComputedColumn {
			name,
			label,
			compute: Compute::Boolean(compute),
		});
		self
	}

	fn computed(&self, name: &str) -> Option<&ComputedColumn<M>> {
		self.computed.iter().find(|column| column.name == name)
	}
}

impl<M: Model> ModelAdmin for ModelAdminConfig<M> {
	type Model = M;

	fn list_display(&self) -> Vec<&str> {
		self.list_display.iter().map(String::as_str).collect()
	}

	fn list_filter(&self) -> Vec<&str> {
		self.list_filter.iter().map(String::as_str).collect()
	}

	fn search_fields(&self) -> Vec<&str> {
		self.search_fields.iter().map(String::as_str).collect()
	}

	fn fieldsets(&self) -> Vec<Fieldset> {
		match &self.fieldsets {
			Some(fieldsets) => fieldsets.clone(),
			None => vec![Fieldset::unnamed(
				M::fields()
					.iter()
					.filter(|field| field.is_editable())
					.map(|field| field.name),
			)],
		}
	}

	fn inlines(&self) -> Vec<Arc<dyn InlineModelAdmin>> {
		self.inlines.clone()
	}

	fn ordering(&self) -> Vec<&str> {
		match &self.ordering {
			Some(ordering) => ordering.iter().map(String::as_str).collect(),
			None => vec!["-id"],
		}
	}

	fn list_per_page(&self) -> Option<usize> {
		self.list_per_page
	}

	fn computed_columns(&self) -> Vec<&str> {
		self.computed.iter().map(|column| column.name).collect()
	}

	fn computed_value(&self, column: &str, object: &M) -> Option<Value> {
		self.computed(column).map(|computed| computed.value(object))
	}

	fn column_label(&self, column: &str) -> String {
		match self.computed(column) {
			Some(computed) => computed.label.to_string(),
			None => column.replace('_', " "),
		}
	}

	fn is_boolean_column(&self, column: &str) -> bool {
		self.computed(column).is_some_and(ComputedColumn::is_boolean)
	}
}
