//! Settings for polls-site
//!
//! Settings are merged from several [`ConfigSource`]s in priority order:
//! built-in defaults, `settings/base.toml`, `settings/{profile}.toml`, then
//! `POLLS_*` environment variables. Later sources override earlier ones key by key.
//!
//! ```no_run
//! use polls_conf::Settings;
//!
//! let settings = Settings::load("settings").unwrap();
//! println!("serving on {}", settings.bind_address);
//! ```

pub mod builder;
pub mod settings;
pub mod sources;

pub use builder::{Profile, SettingsBuilder};
pub use settings::Settings;
pub use sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_description}: {error}")]
	Source {
		source_description: String,
		error: SourceError,
	},

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {message}")]
	Invalid { key: &'static str, message: String },
}
