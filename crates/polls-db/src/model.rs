use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

use crate::manager::Manager;

/// Column type as far as forms, filters and the admin are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// Auto-incrementing integer primary key
	AutoId,
	Integer,
	Text { max_length: usize },
	DateTime,
	/// Integer reference to the primary key of `to` (a table name)
	ForeignKey { to: &'static str },
}

/// Static description of one model field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
	pub name: &'static str,
	pub verbose_name: &'static str,
	pub kind: FieldKind,
	/// Value used when a form leaves the field empty
	pub default: Option<&'static str>,
}

impl FieldMeta {
	pub const fn new(name: &'static str, verbose_name: &'static str, kind: FieldKind) -> Self {
		Self {
			name,
			verbose_name,
			kind,
			default: None,
		}
	}

	pub const fn with_default(mut self, default: &'static str) -> Self {
		self.default = Some(default);
		self
	}

	pub fn is_editable(&self) -> bool {
		!matches!(self.kind, FieldKind::AutoId)
	}
}

/// A database-backed model
///
/// Implementors describe their table and fields; rows are read back through
/// `FromRow` and exposed to templates and the admin through `Serialize`.
///
/// # Examples
///
/// ```
/// use polls_db::{FieldKind, FieldMeta, Model};
/// use serde::Serialize;
/// use sqlx::{FromRow, Row, sqlite::SqliteRow};
///
/// #[derive(Debug, Serialize)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl<'r> FromRow<'r, SqliteRow> for Tag {
///     fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
///         Ok(Self { id: row.try_get("id")?, label: row.try_get("label")? })
///     }
/// }
///
/// const TAG_FIELDS: &[FieldMeta] = &[
///     FieldMeta::new("id", "ID", FieldKind::AutoId),
///     FieldMeta::new("label", "label", FieldKind::Text { max_length: 50 }),
/// ];
///
/// impl Model for Tag {
///     fn table_name() -> &'static str { "blog_tag" }
///     fn app_label() -> &'static str { "blog" }
///     fn model_name() -> &'static str { "tag" }
///     fn fields() -> &'static [FieldMeta] { TAG_FIELDS }
///     fn primary_key(&self) -> i64 { self.id }
/// }
///
/// assert_eq!(Tag::verbose_name_plural(), "tags");
/// assert!(Tag::field("label").is_some());
/// ```
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + Sized + 'static {
	fn table_name() -> &'static str;

	fn app_label() -> &'static str;

	/// Lower-case name used in admin URLs, e.g. `question`
	fn model_name() -> &'static str;

	fn verbose_name() -> &'static str {
		Self::model_name()
	}

	fn verbose_name_plural() -> String {
		format!("{}s", Self::verbose_name())
	}

	fn fields() -> &'static [FieldMeta];

	fn primary_key_field() -> &'static str {
		"id"
	}

	fn primary_key(&self) -> i64;

	/// Human-readable label, Django's `__str__`
	fn display(&self) -> String {
		format!("{} object ({})", Self::verbose_name(), self.primary_key())
	}

	fn field(name: &str) -> Option<&'static FieldMeta> {
		Self::fields().iter().find(|field| field.name == name)
	}

	fn objects() -> Manager<Self> {
		Manager::new()
	}
}
