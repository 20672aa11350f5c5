//! Database layer for polls-site
//!
//! A thin ORM over sqlx's SQLite driver: models describe their table and fields
//! through the [`Model`] trait, [`Manager`] and [`QuerySet`] build parameterized
//! SQL from that metadata, and [`Migrator`] applies schema migrations once.

pub mod connection;
pub mod datetime;
pub mod error;
pub mod manager;
pub mod migrations;
pub mod model;
pub mod query;

pub use connection::DatabaseConnection;
pub use datetime::{
	decode_datetime, encode_datetime, get_datetime, is_storable, truncate_to_storage,
};
pub use error::{DatabaseError, Result};
pub use manager::Manager;
pub use migrations::{Migration, Migrator};
pub use model::{FieldKind, FieldMeta, Model};
pub use query::{Filter, FilterOperator, QuerySet, SqlValue};
