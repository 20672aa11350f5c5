//! Timestamp storage
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text with microsecond
//! precision (`2024-01-31T09:15:00.000000Z`), so comparing or ordering the text in
//! SQL gives chronological results. Only years 0000 to 9999 have that form, so
//! writes outside that range are rejected.

use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use polls_db::encode_datetime;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 31, 9, 15, 0).unwrap();
/// assert_eq!(encode_datetime(&at), "2024-01-31T09:15:00.000000Z");
/// ```
pub fn encode_datetime(value: &DateTime<Utc>) -> String {
	value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether `value` encodes to the fixed-width form
pub fn is_storable(value: &DateTime<Utc>) -> bool {
	(0..=9999).contains(&value.year())
}

pub fn decode_datetime(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
	DateTime::parse_from_rfc3339(raw).map(|value| value.with_timezone(&Utc))
}

/// Drop precision the database does not keep
pub fn truncate_to_storage(value: DateTime<Utc>) -> DateTime<Utc> {
	value.trunc_subsecs(6)
}

/// Read a timestamp column inside a `FromRow` implementation
pub fn get_datetime(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
	let raw: String = row.try_get(column)?;
	decode_datetime(&raw).map_err(|e| sqlx::Error::ColumnDecode {
		index: column.to_string(),
		source: Box::new(e),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};
	use rstest::rstest;

	#[rstest]
	fn test_text_order_is_chronological() {
		let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
		let earlier = encode_datetime(&(base - Duration::microseconds(1)));
		let later = encode_datetime(&(base + Duration::days(400)));

		assert!(earlier < encode_datetime(&base));
		assert!(encode_datetime(&base) < later);
		assert_eq!(earlier.len(), later.len());
	}

	#[rstest]
	#[case(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(), true)]
	#[case(Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap(), true)]
	#[case(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap(), false)]
	#[case(Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap(), false)]
	fn test_storable_range(#[case] value: DateTime<Utc>, #[case] storable: bool) {
		assert_eq!(is_storable(&value), storable);
	}

	#[rstest]
	fn test_decode_inverts_encode_at_storage_precision() {
		let now = truncate_to_storage(Utc::now());

		assert_eq!(decode_datetime(&encode_datetime(&now)).unwrap(), now);
	}
}
