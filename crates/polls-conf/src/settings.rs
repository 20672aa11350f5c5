use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::SettingsError;
use crate::builder::{Profile, SettingsBuilder};

/// Project settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Show error details on error pages
	pub debug: bool,
	pub database_url: String,
	pub bind_address: String,
	/// Default tracing filter when `RUST_LOG` is unset
	pub log_level: String,
	pub time_zone: String,
	/// Heading of the admin site
	pub admin_title: String,
	/// Rows per admin change list page
	pub list_per_page: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			database_url: "sqlite://db.sqlite3".to_string(),
			bind_address: "127.0.0.1:8000".to_string(),
			log_level: "info".to_string(),
			time_zone: "UTC".to_string(),
			admin_title: "Polls administration".to_string(),
			list_per_page: 100,
		}
	}
}

impl Settings {
	/// Load settings for the profile named by `POLLS_ENV` from `dir`
	pub fn load(dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
		SettingsBuilder::for_profile(dir, &Profile::from_env()).build()
	}

	/// Check values that deserialize fine but cannot be used
	pub fn validate(&self) -> Result<(), SettingsError> {
		self.bind_address
			.parse::<SocketAddr>()
			.map_err(|e| SettingsError::Invalid {
				key: "bind_address",
				message: e.to_string(),
			})?;
		if self.list_per_page == 0 {
			return Err(SettingsError::Invalid {
				key: "list_per_page",
				message: "must be at least 1".to_string(),
			});
		}
		if !self.database_url.starts_with("sqlite:") {
			return Err(SettingsError::Invalid {
				key: "database_url",
				message: format!("unsupported database '{}'", self.database_url),
			});
		}
		Ok(())
	}
}
