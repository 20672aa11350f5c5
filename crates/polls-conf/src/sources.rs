//! Configuration sources

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::Settings;

/// Configuration source trait
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Parse error: {0}")]
	Parse(String),
}

/// Built-in defaults, lowest priority
#[derive(Debug, Clone, Default)]
pub struct DefaultSource;

impl DefaultSource {
	pub fn new() -> Self {
		Self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		match serde_json::to_value(Settings::default())? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("defaults are not a table".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default settings".to_string()
	}
}

/// Top-level keys of a TOML file; a missing file contributes nothing
#[derive(Debug, Clone)]
pub struct TomlFileSource {
	path: PathBuf,
	priority: u8,
}

impl TomlFileSource {
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			priority: 50,
		}
	}

	pub fn with_priority(mut self, priority: u8) -> Self {
		self.priority = priority;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let table: toml::Table = toml::from_str(&content)?;

		match serde_json::to_value(table)? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("Expected table at root".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variables with a prefix, highest priority
///
/// `POLLS_DATABASE_URL=sqlite::memory:` sets `database_url`. Integers and booleans
/// are parsed; `debug` also accepts `1/0`, `yes/no` and `on/off`.
#[derive(Debug, Clone)]
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Same parsing as [`ConfigSource::load`], over an explicit list of variables
	pub fn load_from<I>(&self, vars: I) -> IndexMap<String, Value>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut config = IndexMap::new();

		for (key, value) in vars {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let lower_key = clean_key.to_lowercase();

			let parsed_value = if lower_key == "debug" {
				match value.trim().to_lowercase().as_str() {
					"true" | "1" | "yes" | "on" => Value::Bool(true),
					"false" | "0" | "no" | "off" => Value::Bool(false),
					_ => Value::String(value),
				}
			} else if let Ok(num) = value.parse::<i64>() {
				Value::Number(num.into())
			} else if let Ok(b) = value.parse::<bool>() {
				Value::Bool(b)
			} else {
				Value::String(value)
			};

			config.insert(lower_key, parsed_value);
		}

		config
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.load_from(std::env::vars()))
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_missing_toml_file_is_empty() {
		let source = TomlFileSource::new("/definitely/not/here.toml");

		assert!(source.load().unwrap().is_empty());
	}

	#[rstest]
	fn test_toml_file_values() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "debug = true\nlist_per_page = 25\nadmin_title = \"Site\"").unwrap();

		// Act
		let values = TomlFileSource::new(file.path()).load().unwrap();

		// Assert
		assert_eq!(values["debug"], Value::Bool(true));
		assert_eq!(values["list_per_page"], Value::from(25));
		assert_eq!(values["admin_title"], Value::from("Site"));
	}

	#[rstest]
	fn test_invalid_toml_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "debug = = true").unwrap();

		assert!(matches!(
			TomlFileSource::new(file.path()).load(),
			Err(SourceError::Toml(_))
		));
	}

	#[rstest]
	#[case("on", Value::Bool(true))]
	#[case("0", Value::Bool(false))]
	#[case("maybe", Value::from("maybe"))]
	fn test_env_debug_parsing(#[case] raw: &str, #[case] expected: Value) {
		let source = EnvSource::new("POLLS_");

		let values = source.load_from([("POLLS_DEBUG".to_string(), raw.to_string())]);

		assert_eq!(values["debug"], expected);
	}

	#[rstest]
	fn test_env_ignores_other_prefixes() {
		let source = EnvSource::new("POLLS_");

		let values = source.load_from([
			("PATH".to_string(), "/bin".to_string()),
			("POLLS_LIST_PER_PAGE".to_string(), "10".to_string()),
		]);

		assert_eq!(values.len(), 1);
		assert_eq!(values["list_per_page"], Value::from(10));
	}
}
