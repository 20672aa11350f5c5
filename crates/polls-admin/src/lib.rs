//! # polls-admin
//!
//! A Django-style admin for [`polls_db::Model`] types: register a model with a
//! [`ModelAdmin`] on an [`AdminSite`], mount [`AdminSite::urls`] under the site's
//! prefix and get a dashboard, searchable and filterable change lists, add and
//! change forms with inline child rows, and delete confirmation pages.
//!
//! ```rust
//! use polls_admin::{AdminSite, ModelAdminConfig};
//! # use polls_db::{FieldKind, FieldMeta, Model};
//! # use serde::Serialize;
//! # use sqlx::{FromRow, Row, sqlite::SqliteRow};
//! # #[derive(Serialize)]
//! # struct Tag { id: i64, name: String }
//! # impl<'r> FromRow<'r, SqliteRow> for Tag {
//! #     fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
//! #         Ok(Self { id: row.try_get("id")?, name: row.try_get("name")? })
//! #     }
//! # }
//! # impl Model for Tag {
//! #     fn table_name() -> &'static str { "blog_tag" }
//! #     fn app_label() -> &'static str { "blog" }
//! #     fn model_name() -> &'static str { "tag" }
//! #     fn fields() -> &'static [FieldMeta] {
//! #         const FIELDS: &[FieldMeta] = &[
//! #             FieldMeta::new("id", "ID", FieldKind::AutoId),
//! #             FieldMeta::new("name", "name", FieldKind::Text { max_length: 50 }),
//! #         ];
//! #         FIELDS
//! #     }
//! #     fn primary_key(&self) -> i64 { self.id }
//! # }
//!
//! let mut site = AdminSite::new("Blog administration");
//! site.register(ModelAdminConfig::<Tag>::new().with_search_fields(&["name"]))
//!     .unwrap();
//! assert!(site.is_registered::<Tag>());
//! ```

pub mod changelist;
pub mod error;
pub mod filters;
pub mod forms;
pub mod inline;
pub mod model_admin;
pub mod registry;
pub mod site;
mod templates;
pub mod views;

pub use error::{AdminError, AdminResult};
pub use filters::{DateFieldListFilter, DateRange, FilterChoice, FilterSpec, ListParams};
pub use inline::{InlineChange, InlineModelAdmin, InlineObject, InlineType, TabularInline};
pub use model_admin::{ComputedColumn, Fieldset, ModelAdmin, ModelAdminConfig, STR_COLUMN};
pub use site::{AdminSite, AdminUrls, AppEntry, ModelEntry};
