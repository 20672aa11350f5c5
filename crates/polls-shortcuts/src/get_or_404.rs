//! Database query shortcuts with 404 error handling
//!
//! Provides convenient functions for database queries that return 404 errors
//! when objects are not found, similar to Django's get_object_or_404.

use polls_db::{DatabaseConnection, DatabaseError, Model, QuerySet};
use polls_http::Response;

/// Error type for get_or_404 operations
#[derive(Debug, thiserror::Error)]
pub enum GetError {
	#[error("Object not found")]
	NotFound,
	#[error("Multiple objects returned")]
	MultipleObjectsReturned,
	#[error("Database error: {0}")]
	DatabaseError(String),
}

impl From<DatabaseError> for GetError {
	fn from(error: DatabaseError) -> Self {
		match error {
			DatabaseError::DoesNotExist(_) => GetError::NotFound,
			DatabaseError::MultipleObjectsReturned(_) => GetError::MultipleObjectsReturned,
			other => GetError::DatabaseError(other.to_string()),
		}
	}
}

impl From<GetError> for Response {
	fn from(error: GetError) -> Self {
		match error {
			GetError::NotFound => Response::not_found(),
			GetError::MultipleObjectsReturned => {
				Response::bad_request().with_body("Multiple objects returned")
			}
			GetError::DatabaseError(_) => Response::internal_server_error(),
		}
	}
}

impl From<GetError> for polls_http::Error {
	fn from(error: GetError) -> Self {
		match error {
			GetError::NotFound => polls_http::Error::NotFound("Object not found".to_string()),
			GetError::MultipleObjectsReturned => {
				polls_http::Error::Internal("Multiple objects returned".to_string())
			}
			GetError::DatabaseError(message) => polls_http::Error::Database(message),
		}
	}
}

/// Get the single object a queryset matches, or fail with [`GetError::NotFound`]
///
/// Filters on the queryset narrow what counts as found, so restricting the
/// queryset (for example to already-published rows) turns hidden rows into 404s.
pub async fn get_object_or_404<M: Model>(
	conn: &DatabaseConnection,
	queryset: QuerySet<M>,
) -> Result<M, GetError> {
	Ok(queryset.get(conn).await?)
}

/// Get every object a queryset matches, or fail with [`GetError::NotFound`] if none do
pub async fn get_list_or_404<M: Model>(
	conn: &DatabaseConnection,
	queryset: QuerySet<M>,
) -> Result<Vec<M>, GetError> {
	let list = queryset.all(conn).await?;
	if list.is_empty() {
		return Err(GetError::NotFound);
	}
	Ok(list)
}

/// Get a single object or return a 404 error
///
/// Works with any query result that has already been fetched.
///
/// # Examples
///
/// ```
/// use polls_shortcuts::{GetError, get_or_404_response};
///
/// let found: Result<Option<i64>, String> = Ok(Some(3));
/// assert_eq!(get_or_404_response(found).unwrap(), 3);
///
/// let missing: Result<Option<i64>, String> = Ok(None);
/// assert!(matches!(get_or_404_response(missing), Err(GetError::NotFound)));
/// ```
pub fn get_or_404_response<T>(result: Result<Option<T>, String>) -> Result<T, GetError> {
	match result {
		Ok(Some(obj)) => Ok(obj),
		Ok(None) => Err(GetError::NotFound),
		Err(e) => Err(GetError::DatabaseError(e)),
	}
}
