use sqlx::{QueryBuilder, Sqlite};
use std::marker::PhantomData;

use crate::connection::DatabaseConnection;
use crate::datetime::is_storable;
use crate::error::{DatabaseError, Result};
use crate::model::Model;
use crate::query::{FilterOperator, QuerySet, SqlValue, push_value};

/// Entry point for queries and writes on one model, Django's `Model.objects`
pub struct Manager<M> {
	_model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for Manager<M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<M: Model> Manager<M> {
	pub fn new() -> Self {
		Self {
			_model: PhantomData,
		}
	}

	pub fn all(&self) -> QuerySet<M> {
		QuerySet::new()
	}

	pub fn filter(
		&self,
		field: impl Into<String>,
		operator: FilterOperator,
		value: impl Into<SqlValue>,
	) -> QuerySet<M> {
		QuerySet::new().filter(field, operator, value)
	}

	pub async fn get(&self, conn: &DatabaseConnection, pk: i64) -> Result<M> {
		self.filter(M::primary_key_field(), FilterOperator::Eq, pk)
			.get(conn)
			.await
	}

	pub async fn count(&self, conn: &DatabaseConnection) -> Result<i64> {
		self.all().count(conn).await
	}

	fn check_values(values: &[(&str, SqlValue)]) -> Result<()> {
		for (name, value) in values {
			if M::field(name).is_none() {
				return Err(DatabaseError::UnknownField {
					model: M::model_name().to_string(),
					field: name.to_string(),
				});
			}
			if let SqlValue::DateTime(at) = value {
				if !is_storable(at) {
					return Err(DatabaseError::DateTimeOutOfRange(at.to_rfc3339()));
				}
			}
		}
		Ok(())
	}

	/// Insert a row and return its primary key
	pub async fn insert(&self, conn: &DatabaseConnection, values: &[(&str, SqlValue)]) -> Result<i64> {
		Self::check_values(values)?;

		let mut builder: QueryBuilder<'_, Sqlite> = if values.is_empty() {
			QueryBuilder::new(format!("INSERT INTO {} DEFAULT VALUES", M::table_name()))
		} else {
			let columns: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
			let mut builder = QueryBuilder::new(format!(
				"INSERT INTO {} ({}) VALUES (",
				M::table_name(),
				columns.join(", ")
			));
			for (index, (_, value)) in values.iter().enumerate() {
				if index > 0 {
					builder.push(", ");
				}
				push_value(&mut builder, value);
			}
			builder.push(")");
			builder
		};

		let result = builder.build().execute(conn.pool()).await?;
		let id = result.last_insert_rowid();
		tracing::debug!(table = M::table_name(), id, "insert");
		Ok(id)
	}

	/// Update the given columns of one row, returning the number of rows changed
	pub async fn update(
		&self,
		conn: &DatabaseConnection,
		pk: i64,
		values: &[(&str, SqlValue)],
	) -> Result<u64> {
		Self::check_values(values)?;
		if values.is_empty() {
			return Ok(0);
		}

		let mut builder: QueryBuilder<'_, Sqlite> =
			QueryBuilder::new(format!("UPDATE {} SET ", M::table_name()));
		for (index, (name, value)) in values.iter().enumerate() {
			if index > 0 {
				builder.push(", ");
			}
			builder.push(format!("{} = ", name));
			push_value(&mut builder, value);
		}
		builder.push(format!(" WHERE {} = ", M::primary_key_field()));
		builder.push_bind(pk);

		let result = builder.build().execute(conn.pool()).await?;
		tracing::debug!(table = M::table_name(), pk, "update");
		Ok(result.rows_affected())
	}

	pub async fn delete(&self, conn: &DatabaseConnection, pk: i64) -> Result<u64> {
		self.filter(M::primary_key_field(), FilterOperator::Eq, pk)
			.delete(conn)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{FieldKind, FieldMeta};
	use crate::datetime::{get_datetime, truncate_to_storage};
	use chrono::{DateTime, Duration, Utc};
	use rstest::{fixture, rstest};
	use serde::Serialize;
	use sqlx::sqlite::SqliteRow;
	use sqlx::{FromRow, Row};

	#[derive(Debug, Serialize, PartialEq)]
	struct Note {
		id: i64,
		body: String,
		created: DateTime<Utc>,
	}

	impl<'r> FromRow<'r, SqliteRow> for Note {
		fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
			Ok(Self {
				id: row.try_get("id")?,
				body: row.try_get("body")?,
				created: get_datetime(row, "created")?,
			})
		}
	}

	const NOTE_FIELDS: &[FieldMeta] = &[
		FieldMeta::new("id", "ID", FieldKind::AutoId),
		FieldMeta::new("body", "body", FieldKind::Text { max_length: 20 }),
		FieldMeta::new("created", "created", FieldKind::DateTime),
	];

	impl Model for Note {
		fn table_name() -> &'static str {
			"test_note"
		}
		fn app_label() -> &'static str {
			"test"
		}
		fn model_name() -> &'static str {
			"note"
		}
		fn fields() -> &'static [FieldMeta] {
			NOTE_FIELDS
		}
		fn primary_key(&self) -> i64 {
			self.id
		}
	}

	#[fixture]
	async fn conn() -> DatabaseConnection {
		let conn = DatabaseConnection::connect_in_memory().await.unwrap();
		sqlx::query(
			"CREATE TABLE test_note (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL, created TEXT NOT NULL)",
		)
		.execute(conn.pool())
		.await
		.unwrap();
		conn
	}

	async fn add(conn: &DatabaseConnection, body: &str, created: DateTime<Utc>) -> i64 {
		Note::objects()
			.insert(conn, &[("body", body.into()), ("created", created.into())])
			.await
			.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_then_get(#[future] conn: DatabaseConnection) {
		// Arrange
		let conn = conn.await;
		let created = truncate_to_storage(Utc::now());

		// Act
		let id = add(&conn, "hello", created).await;
		let note = Note::objects().get(&conn, id).await.unwrap();

		// Assert
		assert_eq!(
			note,
			Note {
				id,
				body: "hello".into(),
				created
			}
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_missing_row(#[future] conn: DatabaseConnection) {
		let conn = conn.await;

		let result = Note::objects().get(&conn, 99).await;

		assert!(matches!(result, Err(DatabaseError::DoesNotExist(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_timestamp_past_year_9999_is_rejected(#[future] conn: DatabaseConnection) {
		// Arrange
		let conn = conn.await;
		let id = add(&conn, "kept", Utc::now()).await;
		let far_future = Utc::now() + Duration::days(3_000_000);

		// Act
		let inserted = Note::objects()
			.insert(&conn, &[("body", "late".into()), ("created", far_future.into())])
			.await;
		let updated = Note::objects()
			.update(&conn, id, &[("created", far_future.into())])
			.await;

		// Assert
		assert!(matches!(inserted, Err(DatabaseError::DateTimeOutOfRange(_))));
		assert!(matches!(updated, Err(DatabaseError::DateTimeOutOfRange(_))));
		assert_eq!(Note::objects().count(&conn).await.unwrap(), 1);
		assert!(Note::objects().get(&conn, id).await.is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_filter_order_and_limit(#[future] conn: DatabaseConnection) {
		// Arrange
		let conn = conn.await;
		let now = Utc::now();
		add(&conn, "old", now - Duration::days(3)).await;
		add(&conn, "recent", now - Duration::days(1)).await;
		add(&conn, "future", now + Duration::days(1)).await;

		// Act
		let notes = Note::objects()
			.filter("created", FilterOperator::Lte, now)
			.order_by("-created")
			.limit(5)
			.all(&conn)
			.await
			.unwrap();

		// Assert
		let bodies: Vec<_> = notes.iter().map(|n| n.body.as_str()).collect();
		assert_eq!(bodies, vec!["recent", "old"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_icontains_escapes_wildcards(#[future] conn: DatabaseConnection) {
		let conn = conn.await;
		add(&conn, "100% sure", Utc::now()).await;
		add(&conn, "100 percent", Utc::now()).await;

		let count = Note::objects()
			.filter("body", FilterOperator::IContains, "0%")
			.count(&conn)
			.await
			.unwrap();

		assert_eq!(count, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_and_delete(#[future] conn: DatabaseConnection) {
		// Arrange
		let conn = conn.await;
		let id = add(&conn, "draft", Utc::now()).await;

		// Act
		let updated = Note::objects()
			.update(&conn, id, &[("body", "final".into())])
			.await
			.unwrap();
		let body = Note::objects().get(&conn, id).await.unwrap().body;
		let deleted = Note::objects().delete(&conn, id).await.unwrap();

		// Assert
		assert_eq!(updated, 1);
		assert_eq!(body, "final");
		assert_eq!(deleted, 1);
		assert_eq!(Note::objects().count(&conn).await.unwrap(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_field_is_rejected(#[future] conn: DatabaseConnection) {
		let conn = conn.await;

		let result = Note::objects()
			.filter("title; DROP TABLE test_note", FilterOperator::Eq, 1i64)
			.all(&conn)
			.await;

		assert!(matches!(result, Err(DatabaseError::UnknownField { .. })));
	}
}
