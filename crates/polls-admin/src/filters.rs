//! Change list filters
//!
//! A date field listed in `list_filter` gets a [`DateFieldListFilter`]: a sidebar
//! offering "Any date", "Today", "Past 7 days", "This month" and "This year",
//! selected through the `{field}__range` query parameter.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use polls_db::{FieldMeta, FilterOperator, Model, QuerySet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Query parameters of the change list, kept sorted so generated links are stable
pub type ListParams = BTreeMap<String, String>;

/// Page number parameter, dropped whenever a filter changes
pub const PAGE_VAR: &str = "p";

/// Search parameter
pub const SEARCH_VAR: &str = "q";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
	Today,
	PastSevenDays,
	ThisMonth,
	ThisYear,
}

impl DateRange {
	pub const ALL: [DateRange; 4] = [
		DateRange::Today,
		DateRange::PastSevenDays,
		DateRange::ThisMonth,
		DateRange::ThisYear,
	];

	pub fn as_param(self) -> &'static str {
		match self {
			DateRange::Today => "today",
			DateRange::PastSevenDays => "past_7_days",
			DateRange::ThisMonth => "this_month",
			DateRange::ThisYear => "this_year",
		}
	}

	pub fn from_param(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|range| range.as_param() == value)
	}

	pub fn label(self) -> &'static str {
		match self {
			DateRange::Today => "Today",
			DateRange::PastSevenDays => "Past 7 days",
			DateRange::ThisMonth => "This month",
			DateRange::ThisYear => "This year",
		}
	}

	/// Half-open `[start, end)` window containing `now`
	///
	/// Every window ends at the start of tomorrow (or of the next month/year), so
	/// rows dated later today are included.
	///
	/// # Examples
	///
	/// ```
	/// use chrono::{TimeZone, Utc};
	/// use polls_admin::DateRange;
	///
	/// let now = Utc.with_ymd_and_hms(2024, 12, 31, 18, 0, 0).unwrap();
	/// let (start, end) = DateRange::ThisMonth.bounds(now);
	/// assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
	/// assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
	/// ```
	pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
		let today = now.date_naive();
		let tomorrow = today + Duration::days(1);
		let (start, end) = match self {
			DateRange::Today => (today, tomorrow),
			DateRange::PastSevenDays => (today - Duration::days(7), tomorrow),
			DateRange::ThisMonth => {
				let first = today.with_day(1).unwrap_or(today);
				let next = if first.month() == 12 {
					NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
				} else {
					NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
				};
				(first, next.unwrap_or(tomorrow))
			}
			DateRange::ThisYear => {
				let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
				let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(tomorrow);
				(first, next)
			}
		};
		(midnight(start), midnight(end))
	}
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
	date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Encode `params` as a query string starting with `?`
pub fn query_string(params: &ListParams) -> String {
	let encoded = serde_urlencoded::to_string(params).unwrap_or_default();
	format!("?{}", encoded)
}

/// One link in a filter's sidebar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterChoice {
	pub label: &'static str,
	pub query_string: String,
	pub selected: bool,
}

/// Sidebar block for one filter
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterSpec {
	pub title: &'static str,
	pub parameter_name: String,
	pub choices: Vec<FilterChoice>,
}

/// Filter over a timestamp column by calendar window
#[derive(Debug, Clone, Copy)]
pub struct DateFieldListFilter {
	field: &'static str,
	title: &'static str,
}

impl DateFieldListFilter {
	pub fn new(field: &FieldMeta) -> Self {
		Self {
			field: field.name,
			title: field.verbose_name,
		}
	}

	pub fn field_name(&self) -> &'static str {
		self.field
	}

	pub fn parameter_name(&self) -> String {
		format!("{}__range", self.field)
	}

	/// The range selected by `params`; unknown values select nothing
	pub fn selected(&self, params: &ListParams) -> Option<DateRange> {
		params
			.get(&self.parameter_name())
			.and_then(|value| DateRange::from_param(value))
	}

	pub fn queryset<M: Model>(
		&self,
		queryset: QuerySet<M>,
		params: &ListParams,
		now: DateTime<Utc>,
	) -> QuerySet<M> {
		match self.selected(params) {
			Some(range) => {
				let (start, end) = range.bounds(now);
				queryset
					.filter(self.field, FilterOperator::Gte, start)
					.filter(self.field, FilterOperator::Lt, end)
			}
			None => queryset,
		}
	}

	/// Sidebar links; each keeps the other parameters except the page number
	pub fn spec(&self, params: &ListParams) -> FilterSpec {
		let parameter_name = self.parameter_name();
		let selected = self.selected(params);

		let mut base = params.clone();
		base.remove(PAGE_VAR);
		base.remove(&parameter_name);

		let mut choices = vec![FilterChoice {
			label: "Any date",
			query_string: query_string(&base),
			selected: selected.is_none(),
		}];
		for range in DateRange::ALL {
			let mut with_range = base.clone();
			with_range.insert(parameter_name.clone(), range.as_param().to_string());
			choices.push(FilterChoice {
				label: range.label(),
				query_string: query_string(&with_range),
				selected: selected == Some(range),
			});
		}

		FilterSpec {
			title: self.title,
			parameter_name,
			choices,
		}
	}
}
