//! Polls tutorial site
//!
//! Questions and their choices, the public list/detail pages under `/polls/`
//! and an admin site for editing both.
//!
//! - [`apps::polls`]: models, views, URL patterns and admin registration
//! - [`config`]: the project's templates, middleware and URL tree
//! - [`logging`]: tracing setup for the `manage` binary

pub mod apps;
pub mod config;
pub mod logging;

pub use config::{ConfigError, build_application};
