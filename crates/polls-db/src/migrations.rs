//! Schema migrations
//!
//! Each [`Migration`] is a named block of SQL owned by an app. The [`Migrator`]
//! records applied migrations in `schema_migrations` and runs each pending one in
//! its own transaction, so re-running is a no-op.

use chrono::Utc;

use crate::connection::DatabaseConnection;
use crate::datetime::encode_datetime;
use crate::error::{DatabaseError, Result};

const HISTORY_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	app TEXT NOT NULL,
	name TEXT NOT NULL,
	applied TEXT NOT NULL,
	UNIQUE (app, name)
)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
	pub app_label: &'static str,
	pub name: &'static str,
	pub sql: &'static str,
}

impl Migration {
	pub const fn new(app_label: &'static str, name: &'static str, sql: &'static str) -> Self {
		Self {
			app_label,
			name,
			sql,
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct Migrator {
	migrations: Vec<Migration>,
}

impl Migrator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_migrations(mut self, migrations: &[Migration]) -> Self {
		self.migrations.extend_from_slice(migrations);
		self
	}

	pub fn migrations(&self) -> &[Migration] {
		&self.migrations
	}

	/// `(app, name)` pairs already applied, oldest first
	pub async fn applied(&self, conn: &DatabaseConnection) -> Result<Vec<(String, String)>> {
		sqlx::raw_sql(HISTORY_TABLE).execute(conn.pool()).await?;
		let rows = sqlx::query_as::<_, (String, String)>(
			"SELECT app, name FROM schema_migrations ORDER BY id",
		)
		.fetch_all(conn.pool())
		.await?;
		Ok(rows)
	}

	/// Apply every pending migration, returning the ones that ran
	pub async fn run(&self, conn: &DatabaseConnection) -> Result<Vec<Migration>> {
		let applied = self.applied(conn).await?;
		let mut ran = Vec::new();

		for migration in &self.migrations {
			let done = applied
				.iter()
				.any(|(app, name)| app == migration.app_label && name == migration.name);
			if done {
				continue;
			}

			let failed = |e: sqlx::Error| DatabaseError::Migration {
				app: migration.app_label.to_string(),
				name: migration.name.to_string(),
				message: e.to_string(),
			};

			let mut tx = conn.pool().begin().await?;
			sqlx::raw_sql(migration.sql)
				.execute(&mut *tx)
				.await
				.map_err(failed)?;
			sqlx::query("INSERT INTO schema_migrations (app, name, applied) VALUES (?, ?, ?)")
				.bind(migration.app_label)
				.bind(migration.name)
				.bind(encode_datetime(&Utc::now()))
				.execute(&mut *tx)
				.await?;
			tx.commit().await?;

			tracing::info!(app = migration.app_label, name = migration.name, "applied migration");
			ran.push(*migration);
		}

		Ok(ran)
	}
}
