//! Inline editing of related objects
//!
//! An inline edits the rows of a child model that point at the parent through a
//! foreign key, on the parent's change form. Form inputs are named like Django's
//! formsets: `{prefix}-TOTAL_FORMS`, `{prefix}-INITIAL_FORMS` and
//! `{prefix}-{index}-{field}`, where `prefix` defaults to `{model}_set`.

use async_trait::async_trait;
use polls_db::{
	DatabaseConnection, FieldKind, FieldMeta, FilterOperator, Model, QuerySet, SqlValue,
};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

use crate::error::AdminResult;
use crate::forms::{BoundField, FormData, clean_field, format_value, is_unchanged};

/// Inline display type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineType {
	/// Stacked layout (fields displayed vertically)
	Stacked,
	/// Tabular layout (fields displayed in a table row)
	Tabular,
}

/// A write produced by a valid inline formset
#[derive(Debug, Clone, PartialEq)]
pub enum InlineChange {
	Insert(Vec<(&'static str, SqlValue)>),
	Update(i64, Vec<(&'static str, SqlValue)>),
	Delete(i64),
}

/// A child row as read for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineObject {
	pub pk: i64,
	pub display: String,
	pub values: Value,
}

/// Object-safe description of an inline, as held by a parent's admin
#[async_trait]
pub trait InlineModelAdmin: Send + Sync {
	fn model_name(&self) -> &'static str;

	fn verbose_name(&self) -> &'static str;

	fn verbose_name_plural(&self) -> String;

	fn inline_type(&self) -> InlineType;

	/// Form prefix, Django's `{related_name}` formset prefix
	fn prefix(&self) -> String {
		format!("{}_set", self.model_name())
	}

	/// Number of blank rows offered
	fn extra(&self) -> usize;

	fn max_num(&self) -> Option<usize>;

	fn can_delete(&self) -> bool;

	/// Foreign key column pointing at `parent_table`
	fn fk_name(&self, parent_table: &str) -> Option<&'static str>;

	/// Editable fields shown in each row, excluding the foreign key
	fn fields(&self, parent_table: &str) -> Vec<&'static FieldMeta>;

	/// Every child of `parent_pk`, oldest first
	async fn existing(
		&self,
		conn: &DatabaseConnection,
		parent_table: &str,
		parent_pk: i64,
	) -> AdminResult<Vec<InlineObject>>;

	/// Write the changes of a cleaned formset for `parent_pk`
	async fn apply(
		&self,
		conn: &DatabaseConnection,
		parent_table: &str,
		parent_pk: i64,
		changes: &[InlineChange],
	) -> AdminResult<()>;
}

/// Tabular inline of child model `C`
///
/// # Examples
///
/// ```
/// use polls_admin::{InlineModelAdmin, InlineType, TabularInline};
/// # use polls_db::{FieldKind, FieldMeta, Model};
/// # use serde::Serialize;
/// # use sqlx::{FromRow, Row, sqlite::SqliteRow};
/// # #[derive(Serialize)]
/// # struct Comment { id: i64, entry_id: i64, body: String }
/// # impl<'r> FromRow<'r, SqliteRow> for Comment {
/// #     fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
/// #         Ok(Self { id: row.try_get("id")?, entry_id: row.try_get("entry_id")?, body: row.try_get("body")? })
/// #     }
/// # }
/// # const FIELDS: &[FieldMeta] = &[
/// #     FieldMeta::new("id", "ID", FieldKind::AutoId),
/// #     FieldMeta::new("entry_id", "entry", FieldKind::ForeignKey { to: "blog_entry" }),
/// #     FieldMeta::new("body", "body", FieldKind::Text { max_length: 500 }),
/// # ];
/// # impl Model for Comment {
/// #     fn table_name() -> &'static str { "blog_comment" }
/// #     fn app_label() -> &'static str { "blog" }
/// #     fn model_name() -> &'static str { "comment" }
/// #     fn fields() -> &'static [FieldMeta] { FIELDS }
/// #     fn primary_key(&self) -> i64 { self.id }
/// # }
///
/// let inline = TabularInline::<Comment>::new();
/// assert_eq!(inline.extra(), 3);
/// assert_eq!(inline.inline_type(), InlineType::Tabular);
/// assert_eq!(inline.prefix(), "comment_set");
/// assert_eq!(inline.fk_name("blog_entry"), Some("entry_id"));
/// ```
pub struct TabularInline<C> {
	extra: usize,
	max_num: Option<usize>,
	can_delete: bool,
	fields: Option<Vec<&'static str>>,
	_model: PhantomData<fn() -> C>,
}

impl<C: Model> Default for TabularInline<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Model> TabularInline<C> {
	pub fn new() -> Self {
		Self {
			extra: 3,
			max_num: None,
			can_delete: true,
			fields: None,
			_model: PhantomData,
		}
	}

	pub fn with_extra(mut self, extra: usize) -> Self {
		self.extra = extra;
		self
	}

	pub fn with_max_num(mut self, max_num: usize) -> Self {
		self.max_num = Some(max_num);
		self
	}

	pub fn with_can_delete(mut self, can_delete: bool) -> Self {
		self.can_delete = can_delete;
		self
	}

	/// Restrict and order the row's fields
	pub fn with_fields(mut self, fields: &[&'static str]) -> Self {
		self.fields = Some(fields.to_vec());
		self
	}
}

#[async_trait]
impl<C: Model> InlineModelAdmin for TabularInline<C> {
	fn model_name(&self) -> &'static str {
		C::model_name()
	}

	fn verbose_name(&self) -> &'static str {
		C::verbose_name()
	}

	fn verbose_name_plural(&self) -> String {
		C::verbose_name_plural()
	}

	fn inline_type(&self) -> InlineType {
		InlineType::Tabular
	}

	fn extra(&self) -> usize {
		self.extra
	}

	fn max_num(&self) -> Option<usize> {
		self.max_num
	}

	fn can_delete(&self) -> bool {
		self.can_delete
	}

	fn fk_name(&self, parent_table: &str) -> Option<&'static str> {
		C::fields().iter().find_map(|field| match field.kind {
			FieldKind::ForeignKey { to } if to == parent_table => Some(field.name),
			_ => None,
		})
	}

	fn fields(&self, parent_table: &str) -> Vec<&'static FieldMeta> {
		let fk = self.fk_name(parent_table);
		let editable = C::fields()
			.iter()
			.filter(|field| field.is_editable() && Some(field.name) != fk);
		match &self.fields {
			Some(names) => names
				.iter()
				.filter_map(|name| editable.clone().find(|field| field.name == *name))
				.collect(),
			None => editable.collect(),
		}
	}

	async fn existing(
		&self,
		conn: &DatabaseConnection,
		parent_table: &str,
		parent_pk: i64,
	) -> AdminResult<Vec<InlineObject>> {
		let Some(fk) = self.fk_name(parent_table) else {
			return Ok(Vec::new());
		};
		let rows = QuerySet::<C>::new()
			.filter(fk, FilterOperator::Eq, parent_pk)
			.order_by(C::primary_key_field())
			.all(conn)
			.await?;
		Ok(rows
			.iter()
			.map(|row| InlineObject {
				pk: row.primary_key(),
				display: row.display(),
				values: serde_json::to_value(row).unwrap_or(Value::Null),
			})
			.collect())
	}

	async fn apply(
		&self,
		conn: &DatabaseConnection,
		parent_table: &str,
		parent_pk: i64,
		changes: &[InlineChange],
	) -> AdminResult<()> {
		let Some(fk) = self.fk_name(parent_table) else {
			return Ok(());
		};
		let objects = C::objects();
		for change in changes {
			match change {
				InlineChange::Insert(values) => {
					let mut values = values.clone();
					values.push((fk, SqlValue::Integer(parent_pk)));
					let pk = objects.insert(conn, &values).await?;
					tracing::info!(model = C::model_name(), pk, parent_pk, "inline row added");
				}
				InlineChange::Update(pk, values) => {
					objects.update(conn, *pk, values).await?;
				}
				InlineChange::Delete(pk) => {
					objects.delete(conn, *pk).await?;
					tracing::info!(model = C::model_name(), pk, parent_pk, "inline row deleted");
				}
			}
		}
		Ok(())
	}
}

/// One row of an inline formset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineRow {
	pub index: usize,
	pub pk: Option<i64>,
	pub id_input_name: String,
	pub delete_input_name: String,
	pub delete: bool,
	pub fields: Vec<BoundField>,
}

impl InlineRow {
	fn new(prefix: &str, index: usize, pk: Option<i64>) -> Self {
		Self {
			index,
			pk,
			id_input_name: format!("{}-{}-id", prefix, index),
			delete_input_name: format!("{}-{}-DELETE", prefix, index),
			delete: false,
			fields: Vec::new(),
		}
	}
}

/// Template context of an inline formset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineFormset {
	pub prefix: String,
	pub inline_type: InlineType,
	pub verbose_name: &'static str,
	pub verbose_name_plural: String,
	pub headers: Vec<&'static str>,
	pub total_forms: usize,
	pub initial_forms: usize,
	pub can_delete: bool,
	pub rows: Vec<InlineRow>,
	/// Errors not tied to one field
	pub errors: Vec<String>,
}

impl InlineFormset {
	fn empty(inline: &dyn InlineModelAdmin, fields: &[&'static FieldMeta]) -> Self {
		Self {
			prefix: inline.prefix(),
			inline_type: inline.inline_type(),
			verbose_name: inline.verbose_name(),
			verbose_name_plural: inline.verbose_name_plural(),
			headers: fields.iter().map(|field| field.verbose_name).collect(),
			total_forms: 0,
			initial_forms: 0,
			can_delete: inline.can_delete(),
			rows: Vec::new(),
			errors: Vec::new(),
		}
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
			&& self
				.rows
				.iter()
				.all(|row| row.fields.iter().all(|field| field.error.is_none()))
	}

	fn finish(mut self) -> Self {
		self.total_forms = self.rows.len();
		self.initial_forms = self.rows.iter().filter(|row| row.pk.is_some()).count();
		self
	}
}

fn input_name(prefix: &str, index: usize, field: &FieldMeta) -> String {
	format!("{}-{}-{}", prefix, index, field.name)
}

/// Unbound formset: existing rows followed by `extra` blank ones
///
/// Blank rows stop at `max_num` when one is set.
pub fn initial_formset(
	inline: &dyn InlineModelAdmin,
	parent_table: &str,
	existing: &[InlineObject],
) -> InlineFormset {
	let fields = inline.fields(parent_table);
	let mut formset = InlineFormset::empty(inline, &fields);
	let prefix = formset.prefix.clone();

	for (index, object) in existing.iter().enumerate() {
		let mut form = InlineRow::new(&prefix, index, Some(object.pk));
		form.fields = fields
			.iter()
			.map(|field| {
				let value = format_value(field, object.values.get(field.name));
				BoundField::new(field, input_name(&prefix, index, field), value, None)
			})
			.collect();
		formset.rows.push(form);
	}

	let mut extra = inline.extra();
	if let Some(max_num) = inline.max_num() {
		extra = extra.min(max_num.saturating_sub(existing.len()));
	}
	for index in existing.len()..existing.len() + extra {
		let mut form = InlineRow::new(&prefix, index, None);
		form.fields = fields
			.iter()
			.map(|field| BoundField::initial(field, input_name(&prefix, index, field)))
			.collect();
		formset.rows.push(form);
	}

	formset.finish()
}

/// Clean a submitted formset
///
/// Rows naming an existing child are updated, or deleted when their `DELETE` box
/// is ticked. Rows without an id are inserted unless every field was left at its
/// initial value. `existing_ids` are the children of the parent being edited; a
/// row naming any other id is rejected.
pub fn clean_formset(
	inline: &dyn InlineModelAdmin,
	parent_table: &str,
	form: &FormData,
	existing_ids: &[i64],
) -> (InlineFormset, Vec<InlineChange>) {
	let fields = inline.fields(parent_table);
	let mut formset = InlineFormset::empty(inline, &fields);
	let prefix = formset.prefix.clone();
	let mut changes = Vec::new();

	let total = match form.get(&format!("{}-TOTAL_FORMS", prefix)) {
		None => 0,
		Some(raw) => match raw.trim().parse::<usize>() {
			Ok(total) => total,
			Err(_) => {
				formset
					.errors
					.push("ManagementForm data is missing or has been tampered with.".to_string());
				return (formset.finish(), changes);
			}
		},
	};

	let mut kept = 0;
	for index in 0..total {
		let raw_id = form
			.get(&format!("{}-{}-id", prefix, index))
			.map(str::trim)
			.filter(|raw| !raw.is_empty());
		let pk = match raw_id.map(str::parse::<i64>) {
			None => None,
			Some(Ok(pk)) if existing_ids.contains(&pk) => Some(pk),
			Some(_) => {
				formset.errors.push(format!(
					"Row {} does not belong to this object.",
					index + 1
				));
				continue;
			}
		};

		let mut row = InlineRow::new(&prefix, index, pk);
		row.delete = inline.can_delete() && form.is_checked(&row.delete_input_name);

		let raws: Vec<Option<&str>> = fields
			.iter()
			.map(|field| form.get(&input_name(&prefix, index, field)))
			.collect();
		let untouched = fields
			.iter()
			.zip(&raws)
			.all(|(field, raw)| is_unchanged(field, *raw));

		let skip_validation = row.delete || (pk.is_none() && untouched);
		let mut values = Vec::new();
		for (field, raw) in fields.iter().zip(&raws) {
			let name = input_name(&prefix, index, field);
			let value = raw.unwrap_or_default().to_string();
			if skip_validation {
				row.fields.push(BoundField::new(field, name, value, None));
				continue;
			}
			match clean_field(field, *raw) {
				Ok(cleaned) => {
					values.push((field.name, cleaned));
					row.fields.push(BoundField::new(field, name, value, None));
				}
				Err(message) => row.fields.push(BoundField::new(field, name, value, Some(message))),
			}
		}

		let row_valid = row.fields.iter().all(|field| field.error.is_none());
		match (pk, row.delete) {
			(Some(pk), true) => changes.push(InlineChange::Delete(pk)),
			(Some(pk), false) => {
				kept += 1;
				if row_valid {
					changes.push(InlineChange::Update(pk, values));
				}
			}
			(None, _) if skip_validation => {}
			(None, _) => {
				kept += 1;
				if row_valid {
					changes.push(InlineChange::Insert(values));
				}
			}
		}
		formset.rows.push(row);
	}

	if let Some(max_num) = inline.max_num() {
		if kept > max_num {
			formset
				.errors
				.push(format!("Please submit at most {} forms.", max_num));
		}
	}

	(formset.finish(), changes)
}
