//! The polls app: questions, their choices, the public views and the admin setup

pub mod admin;
pub mod migrations;
pub mod models;
pub mod urls;
pub mod views;

pub use models::{Choice, Question};
