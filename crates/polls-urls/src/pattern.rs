//! Path patterns
//!
//! A pattern is literal text with `{name}` or `{<converter:name>}` placeholders:
//!
//! | converter | matches |
//! |---|---|
//! | `str` (default) | any non-empty text without `/` |
//! | `int` | one or more ASCII digits |
//! | `slug` | ASCII letters, digits, `-` and `_` |
//! | `path` | any non-empty text, `/` included |

use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	#[error("Unclosed placeholder in pattern '{0}'")]
	Unclosed(String),

	#[error("Unknown converter '{converter}' in pattern '{pattern}'")]
	UnknownConverter { pattern: String, converter: String },

	#[error("Invalid parameter name '{name}' in pattern '{pattern}'")]
	InvalidName { pattern: String, name: String },

	#[error("Parameter '{name}' appears twice in pattern '{pattern}'")]
	DuplicateParameter { pattern: String, name: String },

	#[error("Pattern '{pattern}' does not compile: {message}")]
	Regex { pattern: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
	Str,
	Int,
	Slug,
	Path,
}

impl Converter {
	fn parse(name: &str) -> Option<Self> {
		match name {
			"str" => Some(Self::Str),
			"int" => Some(Self::Int),
			"slug" => Some(Self::Slug),
			"path" => Some(Self::Path),
			_ => None,
		}
	}

	fn regex(self) -> &'static str {
		match self {
			Self::Str => "[^/]+",
			Self::Int => "[0-9]+",
			Self::Slug => "[-a-zA-Z0-9_]+",
			Self::Path => ".+",
		}
	}

	/// Whether `value` is something this converter would have matched
	pub fn accepts(self, value: &str) -> bool {
		if value.is_empty() {
			return false;
		}
		match self {
			Self::Str => !value.contains('/'),
			Self::Int => value.bytes().all(|b| b.is_ascii_digit()),
			Self::Slug => value
				.bytes()
				.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
			Self::Path => true,
		}
	}
}

#[derive(Debug, Clone)]
enum Segment {
	Literal(String),
	Param { name: String, converter: Converter },
}

/// A compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
	raw: String,
	segments: Vec<Segment>,
	regex: Regex,
}

impl PathPattern {
	/// Compile a pattern
	///
	/// # Examples
	///
	/// ```
	/// use polls_urls::PathPattern;
	///
	/// let pattern = PathPattern::new("/polls/{<int:question_id>}/results/").unwrap();
	/// let params = pattern.matches("/polls/12/results/").unwrap();
	/// assert_eq!(params["question_id"], "12");
	/// assert!(pattern.matches("/polls/abc/results/").is_none());
	/// ```
	pub fn new(raw: impl Into<String>) -> Result<Self, PatternError> {
		let raw = raw.into();
		let segments = parse_segments(&raw)?;

		let mut source = String::from("^");
		for segment in &segments {
			match segment {
				Segment::Literal(text) => source.push_str(&regex::escape(text)),
				Segment::Param { name, converter } => {
					source.push_str(&format!("(?P<{}>{})", name, converter.regex()));
				}
			}
		}
		source.push('$');

		let regex = Regex::new(&source).map_err(|e| PatternError::Regex {
			pattern: raw.clone(),
			message: e.to_string(),
		})?;

		Ok(Self {
			raw,
			segments,
			regex,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	pub fn param_names(&self) -> Vec<&str> {
		self.segments
			.iter()
			.filter_map(|segment| match segment {
				Segment::Param { name, .. } => Some(name.as_str()),
				Segment::Literal(_) => None,
			})
			.collect()
	}

	/// Match a request path, returning the captured parameters
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let captures = self.regex.captures(path)?;
		let params = self
			.param_names()
			.into_iter()
			.filter_map(|name| {
				captures
					.name(name)
					.map(|m| (name.to_string(), m.as_str().to_string()))
			})
			.collect();
		Some(params)
	}

	/// Build a concrete path from parameter values
	///
	/// Returns the name of the offending parameter when one is missing or does not
	/// fit its converter.
	pub(crate) fn fill(&self, params: &HashMap<&str, &str>) -> Result<String, FillError> {
		let mut path = String::with_capacity(self.raw.len());
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => path.push_str(text),
				Segment::Param { name, converter } => {
					let value = params
						.get(name.as_str())
						.ok_or_else(|| FillError::Missing(name.clone()))?;
					if !validate_reverse_param(value) || !converter.accepts(value) {
						return Err(FillError::Invalid {
							name: name.clone(),
							value: value.to_string(),
						});
					}
					path.push_str(value);
				}
			}
		}
		Ok(path)
	}
}

#[derive(Debug)]
pub(crate) enum FillError {
	Missing(String),
	Invalid { name: String, value: String },
}

/// Reject values that would change the shape of the generated URL
pub fn validate_reverse_param(value: &str) -> bool {
	!value.contains("..") && !value.contains(['?', '#', '%', '\\'])
}

fn parse_segments(raw: &str) -> Result<Vec<Segment>, PatternError> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut seen = Vec::new();
	let mut chars = raw.chars();

	while let Some(ch) = chars.next() {
		if ch != '{' {
			literal.push(ch);
			continue;
		}

		let mut body = String::new();
		let mut closed = false;
		for c in chars.by_ref() {
			if c == '}' {
				closed = true;
				break;
			}
			body.push(c);
		}
		if !closed {
			return Err(PatternError::Unclosed(raw.to_string()));
		}

		let (converter, name) = parse_placeholder(raw, &body)?;
		if seen.contains(&name) {
			return Err(PatternError::DuplicateParameter {
				pattern: raw.to_string(),
				name,
			});
		}
		seen.push(name.clone());

		if !literal.is_empty() {
			segments.push(Segment::Literal(std::mem::take(&mut literal)));
		}
		segments.push(Segment::Param { name, converter });
	}

	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	Ok(segments)
}

fn parse_placeholder(raw: &str, body: &str) -> Result<(Converter, String), PatternError> {
	let (converter, name) = match body.strip_prefix('<').and_then(|b| b.strip_suffix('>')) {
		Some(typed) => match typed.split_once(':') {
			Some((conv, name)) => {
				let converter =
					Converter::parse(conv).ok_or_else(|| PatternError::UnknownConverter {
						pattern: raw.to_string(),
						converter: conv.to_string(),
					})?;
				(converter, name)
			}
			None => (Converter::Str, typed),
		},
		None => (Converter::Str, body),
	};

	let valid = name
		.chars()
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
	if !valid {
		return Err(PatternError::InvalidName {
			pattern: raw.to_string(),
			name: name.to_string(),
		});
	}

	Ok((converter, name.to_string()))
}
