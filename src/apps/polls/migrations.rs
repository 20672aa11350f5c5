//! Schema of the polls app

use polls_db::Migration;

pub const INITIAL: Migration = Migration::new(
	"polls",
	"0001_initial",
	"CREATE TABLE polls_question (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	question_text VARCHAR(200) NOT NULL,
	pub_date TEXT NOT NULL
);
CREATE TABLE polls_choice (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	question_id INTEGER NOT NULL REFERENCES polls_question (id) ON DELETE CASCADE,
	choice_text VARCHAR(200) NOT NULL,
	votes INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX polls_choice_question_id ON polls_choice (question_id);",
);

pub const MIGRATIONS: &[Migration] = &[INITIAL];
