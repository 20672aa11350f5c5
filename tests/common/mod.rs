//! Shared fixtures for the site's integration tests

use chrono::{Duration, Utc};
use polls_conf::Settings;
use polls_db::DatabaseConnection;
use polls_site::apps::polls::migrations::MIGRATIONS;
use polls_site::apps::polls::{Choice, Question};
use polls_site::build_application;
use polls_test::{TestClient, migrated_database};

/// A fresh database and a client for the whole site
pub struct Site {
	pub conn: DatabaseConnection,
	pub client: TestClient,
}

impl Site {
	pub async fn new() -> Self {
		Self::with_settings(Settings::default()).await
	}

	pub async fn with_settings(settings: Settings) -> Self {
		let conn = migrated_database(MIGRATIONS).await;
		let application =
			build_application(&settings, conn.clone()).expect("Failed to build application");
		Self {
			conn,
			client: TestClient::new(application),
		}
	}
}

/// Question published `days` from now; negative for the past
#[allow(dead_code)]
pub async fn create_question(conn: &DatabaseConnection, text: &str, days: i64) -> Question {
	Question::create(conn, text, Utc::now() + Duration::days(days))
		.await
		.expect("Failed to create question")
}

#[allow(dead_code)]
pub async fn create_choice(conn: &DatabaseConnection, question: &Question, text: &str) -> Choice {
	Choice::create(conn, question, text)
		.await
		.expect("Failed to create choice")
}
