//! Testing utilities for polls-site
//!
//! [`TestClient`] drives a handler in-process, the way Django's test client does,
//! and returns a [`TestResponse`] that keeps the template context the view used.

pub mod assertions;
pub mod client;
pub mod database;
pub mod response;

pub use assertions::{assert_contains, assert_not_contains, assert_queryset_equal};
pub use client::TestClient;
pub use database::migrated_database;
pub use response::{ResponseExt, TestResponse};
