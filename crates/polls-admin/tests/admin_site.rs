//! The admin site over a model pair unrelated to polls

use chrono::{DateTime, Duration, Utc};
use polls_admin::{AdminError, AdminSite, Fieldset, ModelAdminConfig, TabularInline};
use polls_db::{
	DatabaseConnection, FieldKind, FieldMeta, Migration, Model, SqlValue, get_datetime,
	truncate_to_storage,
};
use polls_http::{Extension, MiddlewareChain};
use polls_test::{ResponseExt, TestClient, migrated_database};
use rstest::rstest;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct Recipe {
	id: i64,
	title: String,
	created: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Recipe {
	fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
		Ok(Self {
			id: row.try_get("id")?,
			title: row.try_get("title")?,
			created: get_datetime(row, "created")?,
		})
	}
}

const RECIPE_FIELDS: &[FieldMeta] = &[
	FieldMeta::new("id", "ID", FieldKind::AutoId),
	FieldMeta::new("title", "title", FieldKind::Text { max_length: 100 }),
	FieldMeta::new("created", "created", FieldKind::DateTime),
];

impl Model for Recipe {
	fn table_name() -> &'static str {
		"kitchen_recipe"
	}
	fn app_label() -> &'static str {
		"kitchen"
	}
	fn model_name() -> &'static str {
		"recipe"
	}
	fn fields() -> &'static [FieldMeta] {
		RECIPE_FIELDS
	}
	fn primary_key(&self) -> i64 {
		self.id
	}
	fn display(&self) -> String {
		self.title.clone()
	}
}

#[derive(Debug, Serialize)]
struct Step {
	id: i64,
	recipe_id: i64,
	text: String,
	minutes: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Step {
	fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
		Ok(Self {
			id: row.try_get("id")?,
			recipe_id: row.try_get("recipe_id")?,
			text: row.try_get("text")?,
			minutes: row.try_get("minutes")?,
		})
	}
}

const STEP_FIELDS: &[FieldMeta] = &[
	FieldMeta::new("id", "ID", FieldKind::AutoId),
	FieldMeta::new(
		"recipe_id",
		"recipe",
		FieldKind::ForeignKey {
			to: "kitchen_recipe",
		},
	),
	FieldMeta::new("text", "text", FieldKind::Text { max_length: 20 }),
	FieldMeta::new("minutes", "minutes", FieldKind::Integer).with_default("0"),
];

impl Model for Step {
	fn table_name() -> &'static str {
		"kitchen_step"
	}
	fn app_label() -> &'static str {
		"kitchen"
	}
	fn model_name() -> &'static str {
		"step"
	}
	fn fields() -> &'static [FieldMeta] {
		STEP_FIELDS
	}
	fn primary_key(&self) -> i64 {
		self.id
	}
}

const KITCHEN: Migration = Migration::new(
	"kitchen",
	"0001_initial",
	"CREATE TABLE kitchen_recipe (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL,
	created TEXT NOT NULL
);
CREATE TABLE kitchen_step (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	recipe_id INTEGER NOT NULL REFERENCES kitchen_recipe (id) ON DELETE CASCADE,
	text TEXT NOT NULL,
	minutes INTEGER NOT NULL DEFAULT 0
);",
);

fn client(site: AdminSite, conn: &DatabaseConnection) -> TestClient {
	let prefix = format!("{}/", site.url_prefix());
	let router = polls_urls::UnifiedRouter::new().mount(&prefix, site.urls());
	let chain = MiddlewareChain::new(Arc::new(router))
		.with_middleware(Arc::new(Extension::new(conn.clone())));
	TestClient::new(Arc::new(chain))
}

async fn create_recipe(conn: &DatabaseConnection, title: &str, age: Duration) -> i64 {
	Recipe::objects()
		.insert(
			conn,
			&[
				("title", SqlValue::from(title)),
				("created", SqlValue::from(truncate_to_storage(Utc::now() - age))),
			],
		)
		.await
		.unwrap()
}

#[rstest]
#[case::unknown_column(ModelAdminConfig::<Recipe>::new().with_list_display(&["title", "rating"]), "rating")]
#[case::filter_on_text(ModelAdminConfig::<Recipe>::new().with_list_filter(&["title"]), "title")]
#[case::search_on_date(ModelAdminConfig::<Recipe>::new().with_search_fields(&["created"]), "created")]
#[case::duplicate_field(
	ModelAdminConfig::<Recipe>::new().with_fieldsets(vec![
		Fieldset::unnamed(["title"]),
		Fieldset::named("Again", ["title"]),
	]),
	"title"
)]
#[case::id_in_fieldset(ModelAdminConfig::<Recipe>::new().with_fieldsets(vec![Fieldset::unnamed(["id"])]), "id")]
#[case::unknown_ordering(ModelAdminConfig::<Recipe>::new().with_ordering(&["-rating"]), "rating")]
fn test_register_rejects_bad_configuration(
	#[case] admin: ModelAdminConfig<Recipe>,
	#[case] culprit: &str,
) {
	// Arrange
	let mut site = AdminSite::new("Kitchen");

	// Act
	let result = site.register(admin);

	// Assert
	match result {
		Err(AdminError::ImproperlyConfigured { model, message }) => {
			assert_eq!(model, "kitchen.recipe");
			assert!(message.contains(culprit), "{}", message);
		}
		other => panic!("expected ImproperlyConfigured, got {:?}", other.err()),
	}
	assert!(!site.is_registered::<Recipe>());
}

#[rstest]
fn test_inline_without_foreign_key_is_rejected() {
	// Arrange
	let mut site = AdminSite::new("Kitchen");
	let admin = ModelAdminConfig::<Step>::new().with_inline(TabularInline::<Recipe>::new());

	// Act
	let result = site.register(admin);

	// Assert
	assert!(matches!(result, Err(AdminError::ImproperlyConfigured { .. })));
}

#[rstest]
fn test_register_twice() {
	// Arrange
	let mut site = AdminSite::new("Kitchen");
	site.register(ModelAdminConfig::<Recipe>::new()).unwrap();

	// Act
	let result = site.register(ModelAdminConfig::<Recipe>::new());

	// Assert
	assert!(matches!(result, Err(AdminError::AlreadyRegistered(name)) if name == "kitchen.recipe"));
}

#[rstest]
#[tokio::test]
async fn test_custom_prefix_and_page_size() {
	// Arrange
	let conn = migrated_database(&[KITCHEN]).await;
	let mut site = AdminSite::new("Kitchen")
		.with_url_prefix("/manage")
		.with_list_per_page(2);
	site.register(ModelAdminConfig::<Recipe>::new().with_ordering(&["title"]))
		.unwrap();
	for title in ["Bread", "Cake", "Soup"] {
		create_recipe(&conn, title, Duration::days(1)).await;
	}
	let client = client(site, &conn);

	// Act
	let dashboard = client.get("/manage/").await;
	let second_page = client.get("/manage/kitchen/recipe/?p=2").await;

	// Assert
	dashboard.assert_ok();
	assert_eq!(
		dashboard.context_value("app_list")[0]["models"][0]["changelist_url"],
		"/manage/kitchen/recipe/"
	);
	second_page.assert_contains("Soup");
	let cl = second_page.context_value("cl");
	assert_eq!(cl["num_pages"], 2);
	assert_eq!(cl["results"].as_array().unwrap().len(), 1);
	assert_eq!(cl["pages"][0]["query_string"], "?p=1");
}

#[rstest]
#[tokio::test]
async fn test_inline_max_num_is_enforced() {
	// Arrange
	let conn = migrated_database(&[KITCHEN]).await;
	let mut site = AdminSite::new("Kitchen");
	site.register(
		ModelAdminConfig::<Recipe>::new().with_inline(TabularInline::<Step>::new().with_max_num(1)),
	)
	.unwrap();
	let client = client(site, &conn);

	// Act
	let response = client
		.post_form(
			"/admin/kitchen/recipe/add/",
			&[
				("title", "Tea"),
				("created", "2024-03-01"),
				("step_set-TOTAL_FORMS", "2"),
				("step_set-0-text", "Boil water"),
				("step_set-1-text", "Steep"),
			],
		)
		.await;

	// Assert
	response.assert_bad_request();
	assert_eq!(
		response.context_value("form")["inlines"][0]["errors"][0],
		"Please submit at most 1 forms."
	);
	assert_eq!(Recipe::objects().count(&conn).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_missing_database_extension_is_a_server_error() {
	// Arrange
	let router = polls_urls::UnifiedRouter::new().mount("/admin/", AdminSite::new("Kitchen").urls());
	let client = TestClient::new(Arc::new(router));

	// Act
	let response = client.get("/admin/").await;

	// Assert
	assert!(response.is_server_error());
}
