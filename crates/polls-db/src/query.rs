//! QuerySet: lazily built, parameterized SELECT/DELETE statements

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use std::marker::PhantomData;

use crate::connection::DatabaseConnection;
use crate::datetime::encode_datetime;
use crate::error::{DatabaseError, Result};
use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
	Eq,
	Gte,
	Lt,
	Lte,
	/// Case-insensitive substring (ASCII), Django's `icontains`
	IContains,
}

/// A value bound into a statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
	Integer(i64),
	Text(String),
	DateTime(DateTime<Utc>),
}

impl From<i64> for SqlValue {
	fn from(value: i64) -> Self {
		SqlValue::Integer(value)
	}
}

impl From<i32> for SqlValue {
	fn from(value: i32) -> Self {
		SqlValue::Integer(i64::from(value))
	}
}

impl From<&str> for SqlValue {
	fn from(value: &str) -> Self {
		SqlValue::Text(value.to_string())
	}
}

impl From<String> for SqlValue {
	fn from(value: String) -> Self {
		SqlValue::Text(value)
	}
}

impl From<DateTime<Utc>> for SqlValue {
	fn from(value: DateTime<Utc>) -> Self {
		SqlValue::DateTime(value)
	}
}

pub(crate) fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &SqlValue) {
	match value {
		SqlValue::Integer(v) => builder.push_bind(*v),
		SqlValue::Text(v) => builder.push_bind(v.clone()),
		SqlValue::DateTime(v) => builder.push_bind(encode_datetime(v)),
	};
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub field: String,
	pub operator: FilterOperator,
	pub value: SqlValue,
}

impl Filter {
	pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<SqlValue>) -> Self {
		Self {
			field: field.into(),
			operator,
			value: value.into(),
		}
	}

	fn push(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
		let column = self.field.as_str();
		match self.operator {
			FilterOperator::IContains => {
				let needle = match &self.value {
					SqlValue::Text(text) => text.clone(),
					other => format!("{:?}", other),
				};
				builder.push(format!("{} LIKE ", column));
				builder.push_bind(format!("%{}%", escape_like(&needle)));
				builder.push(" ESCAPE '\\'");
			}
			operator => {
				let symbol = match operator {
					FilterOperator::Eq => "=",
					FilterOperator::Gte => ">=",
					FilterOperator::Lt => "<",
					_ => "<=",
				};
				builder.push(format!("{} {} ", column, symbol));
				push_value(builder, &self.value);
			}
		}
	}
}

fn escape_like(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

/// Lazy query over one model's table
///
/// Conditions added with [`QuerySet::filter`] are AND-ed; a group added with
/// [`QuerySet::filter_any`] is OR-ed internally. Nothing touches the database
/// until an async terminal method (`all`, `first`, `get`, `count`, `delete`) runs.
///
/// ```
/// use polls_db::{FilterOperator, QuerySet};
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
/// let query = QuerySet::<Entry>::new()
///     .filter("title", FilterOperator::IContains, "rust")
///     .order_by("-id")
///     .limit(5);
/// assert_eq!(
///     query.to_sql().unwrap(),
///     "SELECT id, title FROM blog_entry WHERE (title LIKE ? ESCAPE '\\') ORDER BY id DESC LIMIT 5"
/// );
/// ```
pub struct QuerySet<M> {
	conditions: Vec<Vec<Filter>>,
	ordering: Vec<String>,
	limit: Option<i64>,
	offset: Option<i64>,
	_model: PhantomData<fn() -> M>,
}

impl<M> Clone for QuerySet<M> {
	fn clone(&self) -> Self {
		Self {
			conditions: self.conditions.clone(),
			ordering: self.ordering.clone(),
			limit: self.limit,
			offset: self.offset,
			_model: PhantomData,
		}
	}
}

impl<M: Model> Default for QuerySet<M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<M: Model> QuerySet<M> {
	pub fn new() -> Self {
		Self {
			conditions: Vec::new(),
			ordering: Vec::new(),
			limit: None,
			offset: None,
			_model: PhantomData,
		}
	}

	pub fn filter(
		mut self,
		field: impl Into<String>,
		operator: FilterOperator,
		value: impl Into<SqlValue>,
	) -> Self {
		self.conditions
			.push(vec![Filter::new(field, operator, value)]);
		self
	}

	/// Add a group of conditions of which at least one must hold
	pub fn filter_any(mut self, filters: Vec<Filter>) -> Self {
		if !filters.is_empty() {
			self.conditions.push(filters);
		}
		self
	}

	/// Add an ordering column; a leading `-` sorts descending
	pub fn order_by(mut self, field: impl Into<String>) -> Self {
		self.ordering.push(field.into());
		self
	}

	pub fn limit(mut self, limit: i64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: i64) -> Self {
		self.offset = Some(offset);
		self
	}

	fn check_field(name: &str) -> Result<()> {
		if M::field(name).is_some() {
			Ok(())
		} else {
			Err(DatabaseError::UnknownField {
				model: M::model_name().to_string(),
				field: name.to_string(),
			})
		}
	}

	fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> Result<()> {
		for (index, group) in self.conditions.iter().enumerate() {
			builder.push(if index == 0 { " WHERE (" } else { " AND (" });
			for (position, filter) in group.iter().enumerate() {
				Self::check_field(&filter.field)?;
				if position > 0 {
					builder.push(" OR ");
				}
				filter.push(builder);
			}
			builder.push(")");
		}
		Ok(())
	}

	fn select_builder(&self) -> Result<QueryBuilder<'static, Sqlite>> {
		let columns: Vec<&str> = M::fields().iter().map(|field| field.name).collect();
		let mut builder =
			QueryBuilder::new(format!("SELECT {} FROM {}", columns.join(", "), M::table_name()));
		self.push_where(&mut builder)?;

		if !self.ordering.is_empty() {
			let mut terms = Vec::with_capacity(self.ordering.len());
			for entry in &self.ordering {
				let (field, direction) = match entry.strip_prefix('-') {
					Some(field) => (field, "DESC"),
					None => (entry.as_str(), "ASC"),
				};
				Self::check_field(field)?;
				terms.push(format!("{} {}", field, direction));
			}
			builder.push(" ORDER BY ");
			builder.push(terms.join(", "));
		}

		match (self.limit, self.offset) {
			(Some(limit), offset) => {
				builder.push(format!(" LIMIT {}", limit));
				if let Some(offset) = offset {
					builder.push(format!(" OFFSET {}", offset));
				}
			}
			(None, Some(offset)) => {
				builder.push(format!(" LIMIT -1 OFFSET {}", offset));
			}
			(None, None) => {}
		}
		Ok(builder)
	}

	/// SQL text of the SELECT this query would run, with `?` placeholders
	pub fn to_sql(&self) -> Result<String> {
		Ok(self.select_builder()?.sql().to_string())
	}

	pub async fn all(&self, conn: &DatabaseConnection) -> Result<Vec<M>> {
		let mut builder = self.select_builder()?;
		tracing::debug!(sql = builder.sql(), "select");
		let rows = builder.build_query_as::<M>().fetch_all(conn.pool()).await?;
		Ok(rows)
	}

	pub async fn first(&self, conn: &DatabaseConnection) -> Result<Option<M>> {
		let mut builder = self.clone().limit(1).select_builder()?;
		let row = builder
			.build_query_as::<M>()
			.fetch_optional(conn.pool())
			.await?;
		Ok(row)
	}

	/// Exactly one matching row
	///
	/// # Errors
	///
	/// [`DatabaseError::DoesNotExist`] when nothing matches and
	/// [`DatabaseError::MultipleObjectsReturned`] when more than one row does.
	pub async fn get(&self, conn: &DatabaseConnection) -> Result<M> {
		let mut rows = self.clone().limit(2).all(conn).await?;
		match rows.len() {
			0 => Err(DatabaseError::DoesNotExist(M::verbose_name().to_string())),
			1 => Ok(rows.remove(0)),
			_ => Err(DatabaseError::MultipleObjectsReturned(
				M::verbose_name().to_string(),
			)),
		}
	}

	pub async fn count(&self, conn: &DatabaseConnection) -> Result<i64> {
		let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", M::table_name()));
		self.push_where(&mut builder)?;
		let count = builder
			.build_query_scalar::<i64>()
			.fetch_one(conn.pool())
			.await?;
		Ok(count)
	}

	pub async fn exists(&self, conn: &DatabaseConnection) -> Result<bool> {
		Ok(self.first(conn).await?.is_some())
	}

	/// Delete every matching row, returning how many were removed
	pub async fn delete(&self, conn: &DatabaseConnection) -> Result<u64> {
		let mut builder = QueryBuilder::new(format!("DELETE FROM {}", M::table_name()));
		self.push_where(&mut builder)?;
		let result = builder.build().execute(conn.pool()).await?;
		tracing::debug!(table = M::table_name(), rows = result.rows_affected(), "delete");
		Ok(result.rows_affected())
	}
}
