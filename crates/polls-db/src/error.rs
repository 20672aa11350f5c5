use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("{0} matching query does not exist")]
	DoesNotExist(String),

	#[error("get() returned more than one {0}")]
	MultipleObjectsReturned(String),

	#[error("Timestamp {0} is outside the storable range (years 0000 to 9999)")]
	DateTimeOutOfRange(String),

	#[error("Cannot resolve keyword '{field}' into field of {model}")]
	UnknownField { model: String, field: String },

	#[error("Migration {app}.{name} failed: {message}")]
	Migration {
		app: String,
		name: String,
		message: String,
	},
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

impl DatabaseError {
	pub fn is_does_not_exist(&self) -> bool {
		matches!(self, DatabaseError::DoesNotExist(_))
	}
}

/// Missing rows become 404s; everything else is a server fault
impl From<DatabaseError> for polls_http::Error {
	fn from(error: DatabaseError) -> Self {
		match error {
			DatabaseError::DoesNotExist(model) => {
				polls_http::Error::NotFound(format!("No {} matches the given query.", model))
			}
			other => polls_http::Error::Database(other.to_string()),
		}
	}
}
