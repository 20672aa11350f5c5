use chrono::{DateTime, Duration, Utc};
use polls_db::{
	DatabaseConnection, FieldKind, FieldMeta, Model, Result, SqlValue, get_datetime,
	truncate_to_storage,
};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

const QUESTION_FIELDS: &[FieldMeta] = &[
	FieldMeta::new("id", "ID", FieldKind::AutoId),
	FieldMeta::new("question_text", "question text", FieldKind::Text { max_length: 200 }),
	FieldMeta::new("pub_date", "date published", FieldKind::DateTime),
];

const CHOICE_FIELDS: &[FieldMeta] = &[
	FieldMeta::new("id", "ID", FieldKind::AutoId),
	FieldMeta::new(
		"question_id",
		"question",
		FieldKind::ForeignKey {
			to: "polls_question",
		},
	),
	FieldMeta::new("choice_text", "choice text", FieldKind::Text { max_length: 200 }),
	FieldMeta::new("votes", "votes", FieldKind::Integer).with_default("0"),
];

/// Poll question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
	pub id: i64,
	pub question_text: String,
	pub pub_date: DateTime<Utc>,
}

impl Question {
	/// Insert a question and return it as stored
	pub async fn create(
		conn: &DatabaseConnection,
		question_text: &str,
		pub_date: DateTime<Utc>,
	) -> Result<Self> {
		let pub_date = truncate_to_storage(pub_date);
		let id = Self::objects()
			.insert(
				conn,
				&[
					("question_text", SqlValue::from(question_text)),
					("pub_date", SqlValue::from(pub_date)),
				],
			)
			.await?;
		Ok(Self {
			id,
			question_text: question_text.to_string(),
			pub_date,
		})
	}

	/// Published within the day before `now`, `now` included
	pub fn was_published_recently_at(&self, now: DateTime<Utc>) -> bool {
		now - Duration::days(1) <= self.pub_date && self.pub_date <= now
	}

	pub fn was_published_recently(&self) -> bool {
		self.was_published_recently_at(Utc::now())
	}
}

impl<'r> FromRow<'r, SqliteRow> for Question {
	fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
		Ok(Self {
			id: row.try_get("id")?,
			question_text: row.try_get("question_text")?,
			pub_date: get_datetime(row, "pub_date")?,
		})
	}
}

impl Model for Question {
	fn table_name() -> &'static str {
		"polls_question"
	}

	fn app_label() -> &'static str {
		"polls"
	}

	fn model_name() -> &'static str {
		"question"
	}

	fn fields() -> &'static [FieldMeta] {
		QUESTION_FIELDS
	}

	fn primary_key(&self) -> i64 {
		self.id
	}

	fn display(&self) -> String {
		self.question_text.clone()
	}
}

/// One answer to a [`Question`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
	pub id: i64,
	pub question_id: i64,
	pub choice_text: String,
	pub votes: i32,
}

impl Choice {
	pub async fn create(
		conn: &DatabaseConnection,
		question: &Question,
		choice_text: &str,
	) -> Result<Self> {
		let id = Self::objects()
			.insert(
				conn,
				&[
					("question_id", SqlValue::from(question.id)),
					("choice_text", SqlValue::from(choice_text)),
				],
			)
			.await?;
		Ok(Self {
			id,
			question_id: question.id,
			choice_text: choice_text.to_string(),
			votes: 0,
		})
	}

	/// Count one more vote; not saved
	pub fn vote(&mut self) {
		self.votes += 1;
	}
}

impl<'r> FromRow<'r, SqliteRow> for Choice {
	fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
		Ok(Self {
			id: row.try_get("id")?,
			question_id: row.try_get("question_id")?,
			choice_text: row.try_get("choice_text")?,
			votes: row.try_get("votes")?,
		})
	}
}

impl Model for Choice {
	fn table_name() -> &'static str {
		"polls_choice"
	}

	fn app_label() -> &'static str {
		"polls"
	}

	fn model_name() -> &'static str {
		"choice"
	}

	fn fields() -> &'static [FieldMeta] {
		CHOICE_FIELDS
	}

	fn primary_key(&self) -> i64 {
		self.id
	}

	fn display(&self) -> String {
		self.choice_text.clone()
	}
}
