use polls_db::{DatabaseConnection, Migration, Migrator};

/// Fresh in-memory database with `migrations` applied
///
/// # Panics
///
/// Panics when the database cannot be opened or a migration fails.
pub async fn migrated_database(migrations: &[Migration]) -> DatabaseConnection {
	let conn = DatabaseConnection::connect_in_memory()
		.await
		.expect("Failed to open in-memory database");
	Migrator::new()
		.with_migrations(migrations)
		.run(&conn)
		.await
		.expect("Failed to apply migrations");
	conn
}
