//! Form data parsing and field cleaning
//!
//! Admin forms are plain `application/x-www-form-urlencoded` posts. Each model
//! field is cleaned according to its [`FieldKind`]; failures are reported per field
//! with the messages users of Django's admin will recognize.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polls_db::{FieldKind, FieldMeta, SqlValue, decode_datetime, is_storable};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{AdminError, AdminResult};

/// Format used to show timestamps in form inputs
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%dT%H:%M",
];

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_INTEGER: &str = "Enter a whole number.";
pub const INVALID_DATETIME: &str = "Enter a valid date/time.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Submitted form fields; the last value of a repeated key wins
#[derive(Debug, Clone, Default)]
pub struct FormData {
	values: HashMap<String, String>,
}

impl FormData {
	pub fn parse(body: &[u8]) -> AdminResult<Self> {
		let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
			.map_err(|e| AdminError::BadRequest(format!("Invalid form body: {}", e)))?;
		Ok(Self::from_pairs(pairs))
	}

	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			values: pairs
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		}
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	/// Checkbox semantics: present and not an explicit "off" value
	pub fn is_checked(&self, key: &str) -> bool {
		match self.get(key) {
			Some(value) => !matches!(value.trim(), "" | "0" | "false" | "off"),
			None => false,
		}
	}
}

/// Parse a timestamp typed into a form, interpreted as UTC
///
/// # Examples
///
/// ```
/// use polls_admin::forms::parse_datetime;
///
/// assert!(parse_datetime("2024-03-01 09:30:00").is_some());
/// assert!(parse_datetime("2024-03-01T09:30").is_some());
/// assert!(parse_datetime("2024-03-01").is_some());
/// assert!(parse_datetime("yesterday").is_none());
/// ```
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	for format in DATETIME_INPUT_FORMATS {
		if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
			return Some(naive.and_utc());
		}
	}
	if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
		return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
	}
	decode_datetime(raw).ok()
}

/// Whether `raw` leaves the field at its untouched state (empty or its default)
pub fn is_unchanged(field: &FieldMeta, raw: Option<&str>) -> bool {
	let raw = raw.map(str::trim).unwrap_or("");
	raw.is_empty() || field.default == Some(raw)
}

/// Convert one submitted value into a column value
pub fn clean_field(field: &FieldMeta, raw: Option<&str>) -> Result<SqlValue, String> {
	let mut raw = raw.map(str::trim).unwrap_or("");
	if raw.is_empty() {
		match field.default {
			Some(default) => raw = default,
			None => return Err(REQUIRED.to_string()),
		}
	}

	match field.kind {
		FieldKind::Text { max_length } => {
			let length = raw.chars().count();
			if length > max_length {
				return Err(format!(
					"Ensure this value has at most {} characters (it has {}).",
					max_length, length
				));
			}
			Ok(SqlValue::Text(raw.to_string()))
		}
		FieldKind::Integer | FieldKind::AutoId => raw
			.parse::<i64>()
			.map(SqlValue::Integer)
			.map_err(|_| INVALID_INTEGER.to_string()),
		FieldKind::ForeignKey { .. } => raw
			.parse::<i64>()
			.map(SqlValue::Integer)
			.map_err(|_| INVALID_CHOICE.to_string()),
		FieldKind::DateTime => parse_datetime(raw)
			.filter(is_storable)
			.map(SqlValue::DateTime)
			.ok_or_else(|| INVALID_DATETIME.to_string()),
	}
}

/// Render a serialized column value the way a form input shows it
pub fn format_value(field: &FieldMeta, value: Option<&Value>) -> String {
	match value {
		None | Some(Value::Null) => String::new(),
		Some(Value::String(text)) => match field.kind {
			FieldKind::DateTime => decode_datetime(text)
				.map(|at| at.format(DATETIME_INPUT_FORMAT).to_string())
				.unwrap_or_else(|_| text.clone()),
			_ => text.clone(),
		},
		Some(other) => other.to_string(),
	}
}

fn widget(kind: FieldKind) -> &'static str {
	match kind {
		FieldKind::Text { .. } => "text",
		FieldKind::Integer | FieldKind::AutoId | FieldKind::ForeignKey { .. } => "number",
		FieldKind::DateTime => "datetime",
	}
}

/// A field with its current value and error, ready for a template
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoundField {
	pub name: &'static str,
	/// Name of the `<input>`, prefixed for inline rows
	pub input_name: String,
	pub label: &'static str,
	pub widget: &'static str,
	pub value: String,
	pub required: bool,
	pub max_length: Option<usize>,
	pub error: Option<String>,
}

impl BoundField {
	pub fn new(field: &FieldMeta, input_name: String, value: String, error: Option<String>) -> Self {
		let max_length = match field.kind {
			FieldKind::Text { max_length } => Some(max_length),
			_ => None,
		};
		Self {
			name: field.name,
			input_name,
			label: field.verbose_name,
			widget: widget(field.kind),
			value,
			required: field.default.is_none(),
			max_length,
			error,
		}
	}

	/// Unbound field showing the column default, as on an add form
	pub fn initial(field: &FieldMeta, input_name: String) -> Self {
		let value = field.default.unwrap_or_default().to_string();
		Self::new(field, input_name, value, None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Timelike};
	use rstest::rstest;

	const TEXT: FieldMeta = FieldMeta::new("question_text", "question text", FieldKind::Text { max_length: 10 });
	const VOTES: FieldMeta = FieldMeta::new("votes", "votes", FieldKind::Integer).with_default("0");
	const PUB_DATE: FieldMeta = FieldMeta::new("pub_date", "date published", FieldKind::DateTime);

	#[rstest]
	fn test_form_data_last_value_wins() {
		let form = FormData::parse(b"q=a&q=b&DELETE=on&other=").unwrap();

		assert_eq!(form.get("q"), Some("b"));
		assert!(form.is_checked("DELETE"));
		assert!(!form.is_checked("other"));
		assert!(!form.is_checked("missing"));
	}

	#[rstest]
	#[case(TEXT, "", REQUIRED)]
	#[case(TEXT, "   ", REQUIRED)]
	#[case(VOTES, "many", INVALID_INTEGER)]
	#[case(PUB_DATE, "soon", INVALID_DATETIME)]
	#[case(PUB_DATE, "+10240-01-01 00:00:00", INVALID_DATETIME)]
	fn test_clean_field_errors(#[case] field: FieldMeta, #[case] raw: &str, #[case] message: &str) {
		assert_eq!(clean_field(&field, Some(raw)), Err(message.to_string()));
	}

	#[rstest]
	fn test_clean_text_over_max_length() {
		let result = clean_field(&TEXT, Some("What's new today?"));

		assert_eq!(
			result,
			Err("Ensure this value has at most 10 characters (it has 17).".to_string())
		);
	}

	#[rstest]
	fn test_clean_blank_field_uses_default() {
		assert_eq!(clean_field(&VOTES, None), Ok(SqlValue::Integer(0)));
	}

	#[rstest]
	fn test_clean_datetime_is_utc() {
		let cleaned = clean_field(&PUB_DATE, Some("2024-02-29 23:15:00")).unwrap();

		let expected = Utc.with_ymd_and_hms(2024, 2, 29, 23, 15, 0).unwrap();
		assert_eq!(cleaned, SqlValue::DateTime(expected));
		assert_eq!(expected.hour(), 23);
	}

	#[rstest]
	fn test_format_value_for_datetime_input() {
		let stored = Value::from("2024-02-29T23:15:00.250000Z");

		assert_eq!(format_value(&PUB_DATE, Some(&stored)), "2024-02-29 23:15:00");
		assert_eq!(format_value(&VOTES, Some(&Value::from(3))), "3");
		assert_eq!(format_value(&TEXT, None), "");
	}

	#[rstest]
	#[case(None, true)]
	#[case(Some("0"), true)]
	#[case(Some("2"), false)]
	fn test_is_unchanged(#[case] raw: Option<&str>, #[case] unchanged: bool) {
		assert_eq!(is_unchanged(&VOTES, raw), unchanged);
	}
}
