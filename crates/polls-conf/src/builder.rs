use serde_json::{Map, Value};
use std::path::Path;

use crate::SettingsError;
use crate::settings::Settings;
use crate::sources::{ConfigSource, DefaultSource, EnvSource, TomlFileSource};

pub const PROFILE_VAR: &str = "POLLS_ENV";
pub const ENV_PREFIX: &str = "POLLS_";

/// Deployment profile selecting `settings/{name}.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// `POLLS_ENV`, or `local` when unset or empty
	pub fn from_env() -> Self {
		match std::env::var(PROFILE_VAR) {
			Ok(name) if !name.trim().is_empty() => Self(name.trim().to_string()),
			_ => Self("local".to_string()),
		}
	}

	pub fn name(&self) -> &str {
		&self.0
	}
}

/// Merges sources into [`Settings`]
///
/// # Examples
///
/// ```
/// use polls_conf::{DefaultSource, SettingsBuilder};
///
/// let settings = SettingsBuilder::new()
///     .add_source(DefaultSource::new())
///     .build()
///     .unwrap();
/// assert_eq!(settings.list_per_page, 100);
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Defaults, `{dir}/base.toml`, `{dir}/{profile}.toml`, then `POLLS_*` variables
	pub fn for_profile(dir: impl AsRef<Path>, profile: &Profile) -> Self {
		let dir = dir.as_ref();
		Self::new()
			.add_source(DefaultSource::new())
			.add_source(TomlFileSource::new(dir.join("base.toml")).with_priority(50))
			.add_source(
				TomlFileSource::new(dir.join(format!("{}.toml", profile.name()))).with_priority(60),
			)
			.add_source(EnvSource::new(ENV_PREFIX))
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(mut self) -> Result<Settings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in &self.sources {
			let values = source.load().map_err(|error| SettingsError::Source {
				source_description: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = values.len(), "settings loaded");
			merged.extend(values);
		}

		let settings: Settings = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}
