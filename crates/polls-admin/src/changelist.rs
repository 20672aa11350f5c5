//! The change list: search, filters, ordering and paging over one model

use chrono::{DateTime, Utc};
use polls_db::{DatabaseConnection, Filter, FilterOperator, Model, QuerySet};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AdminError, AdminResult};
use crate::filters::{DateFieldListFilter, FilterSpec, ListParams, PAGE_VAR, SEARCH_VAR, query_string};
use crate::forms::format_value;
use crate::model_admin::{ModelAdmin, STR_COLUMN};
use crate::site::AdminUrls;

#[derive(Debug, Clone, Serialize)]
pub struct Column {
	pub name: String,
	pub label: String,
	pub boolean: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
	pub value: Value,
	pub boolean: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
	pub pk: i64,
	pub change_url: String,
	pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
	pub number: usize,
	pub query_string: String,
	pub current: bool,
}

/// Everything the change list template shows
#[derive(Debug, Clone, Serialize)]
pub struct ChangeList {
	pub columns: Vec<Column>,
	pub results: Vec<ResultRow>,
	pub filters: Vec<FilterSpec>,
	pub search_enabled: bool,
	pub query: String,
	/// Rows matching the search and filters
	pub result_count: i64,
	/// Rows in the table
	pub full_count: i64,
	pub page: usize,
	pub num_pages: usize,
	pub pages: Vec<PageLink>,
}

fn columns<A: ModelAdmin>(admin: &A) -> Vec<Column> {
	admin
		.list_display()
		.into_iter()
		.map(|name| {
			let label = if name == STR_COLUMN {
				<A::Model as Model>::verbose_name().to_string()
			} else if let Some(field) = <A::Model as Model>::field(name) {
				field.verbose_name.to_string()
			} else {
				admin.column_label(name)
			};
			Column {
				name: name.to_string(),
				label,
				boolean: admin.is_boolean_column(name),
			}
		})
		.collect()
}

fn cell<A: ModelAdmin>(admin: &A, column: &Column, object: &A::Model, values: &Value) -> Cell {
	let value = if column.name == STR_COLUMN {
		Value::String(object.display())
	} else if let Some(field) = <A::Model as Model>::field(&column.name) {
		Value::String(format_value(field, values.get(field.name)))
	} else {
		admin
			.computed_value(&column.name, object)
			.unwrap_or(Value::Null)
	};
	Cell {
		value,
		boolean: column.boolean,
	}
}

fn search<M: Model>(queryset: QuerySet<M>, fields: &[&str], query: &str) -> QuerySet<M> {
	if fields.is_empty() {
		return queryset;
	}
	query.split_whitespace().fold(queryset, |queryset, term| {
		queryset.filter_any(
			fields
				.iter()
				.map(|field| Filter::new(*field, FilterOperator::IContains, term))
				.collect(),
		)
	})
}

/// Build the change list for `params`
///
/// # Errors
///
/// [`AdminError::NotFound`] for a page number outside the results.
pub async fn build<A: ModelAdmin>(
	admin: &A,
	conn: &DatabaseConnection,
	params: &ListParams,
	default_per_page: usize,
	now: DateTime<Utc>,
	urls: &AdminUrls,
) -> AdminResult<ChangeList> {
	let objects = <A::Model as Model>::objects();
	let full_count = objects.count(conn).await?;

	let query = params
		.get(SEARCH_VAR)
		.map(|q| q.trim().to_string())
		.unwrap_or_default();
	let search_fields = admin.search_fields();
	let mut queryset = search(objects.all(), &search_fields, &query);

	let mut filters = Vec::new();
	for name in admin.list_filter() {
		if let Some(field) = <A::Model as Model>::field(name) {
			let filter = DateFieldListFilter::new(field);
			queryset = filter.queryset(queryset, params, now);
			filters.push(filter.spec(params));
		}
	}

	let result_count = queryset.count(conn).await?;

	let pk_field = <A::Model as Model>::primary_key_field();
	let ordering = admin.ordering();
	let has_pk = ordering
		.iter()
		.any(|term| term.trim_start_matches('-') == pk_field);
	for term in &ordering {
		queryset = queryset.order_by(*term);
	}
	if !has_pk {
		queryset = queryset.order_by(format!("-{}", pk_field));
	}

	let per_page = admin.list_per_page().unwrap_or(default_per_page).max(1);
	let num_pages = (result_count.max(0) as usize).div_ceil(per_page).max(1);
	let page = match params.get(PAGE_VAR) {
		None => 1,
		Some(raw) => raw
			.parse::<usize>()
			.ok()
			.filter(|page| (1..=num_pages).contains(page))
			.ok_or_else(|| AdminError::NotFound(format!("Invalid page ({})", raw)))?,
	};
	let rows = queryset
		.limit(per_page as i64)
		.offset(((page - 1) * per_page) as i64)
		.all(conn)
		.await?;

	let columns = columns(admin);
	let app_label = <A::Model as Model>::app_label();
	let model_name = <A::Model as Model>::model_name();
	let results = rows
		.iter()
		.map(|object| {
			let values = serde_json::to_value(object).unwrap_or(Value::Null);
			ResultRow {
				pk: object.primary_key(),
				change_url: urls.change(app_label, model_name, object.primary_key()),
				cells: columns
					.iter()
					.map(|column| cell(admin, column, object, &values))
					.collect(),
			}
		})
		.collect();

	let pages = if num_pages > 1 {
		(1..=num_pages)
			.map(|number| {
				let mut with_page = params.clone();
				with_page.insert(PAGE_VAR.to_string(), number.to_string());
				PageLink {
					number,
					query_string: query_string(&with_page),
					current: number == page,
				}
			})
			.collect()
	} else {
		Vec::new()
	};

	Ok(ChangeList {
		columns,
		results,
		filters,
		search_enabled: !search_fields.is_empty(),
		query,
		result_count,
		full_count,
		page,
		num_pages,
		pages,
	})
}
