use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::Result;

/// Shared handle to the SQLite pool
///
/// Cloning is cheap; every clone uses the same pool.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
	pool: SqlitePool,
}

impl DatabaseConnection {
	/// Connect to a database URL such as `sqlite://db.sqlite3` or `sqlite::memory:`
	///
	/// Missing database files are created and foreign key enforcement is enabled.
	pub async fn connect(url: &str) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(url)?
			.create_if_missing(true)
			.foreign_keys(true);

		let pool = if url.contains(":memory:") {
			// Every connection to :memory: is its own database, so keep exactly one alive.
			SqlitePoolOptions::new()
				.max_connections(1)
				.min_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
				.connect_with(options)
				.await?
		} else {
			SqlitePoolOptions::new()
				.max_connections(5)
				.connect_with(options)
				.await?
		};

		tracing::debug!(url, "database connected");
		Ok(Self { pool })
	}

	/// Fresh private in-memory database
	pub async fn connect_in_memory() -> Result<Self> {
		Self::connect("sqlite::memory:").await
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Whether `table` has a row whose `id` is `pk`
	pub async fn row_exists(&self, table: &str, pk: i64) -> Result<bool> {
		let exists: bool = sqlx::query_scalar(&format!(
			"SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
			table
		))
		.bind(pk)
		.fetch_one(&self.pool)
		.await?;
		Ok(exists)
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_in_memory_database_persists_across_queries() {
		// Arrange
		let conn = DatabaseConnection::connect_in_memory().await.unwrap();
		sqlx::query("CREATE TABLE t (v INTEGER)")
			.execute(conn.pool())
			.await
			.unwrap();

		// Act
		sqlx::query("INSERT INTO t (v) VALUES (1)")
			.execute(conn.pool())
			.await
			.unwrap();
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
			.fetch_one(conn.pool())
			.await
			.unwrap();

		// Assert
		assert_eq!(count, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_foreign_keys_are_enforced() {
		let conn = DatabaseConnection::connect_in_memory().await.unwrap();
		let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
			.fetch_one(conn.pool())
			.await
			.unwrap();

		assert_eq!(enabled, 1);
	}
}
