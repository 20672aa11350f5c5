//! URL routing for polls-site
//!
//! Routes are declared with Django-style path patterns and optional names, grouped
//! into a [`UnifiedRouter`] that can be mounted under a prefix and namespace. The
//! router is itself a [`polls_http::Handler`].
//!
//! ```
//! use polls_http::{Request, Response, Result, handler_fn};
//! use polls_urls::UnifiedRouter;
//!
//! async fn detail(request: Request) -> Result<Response> {
//!     let id: i64 = request.path_param("question_id")?;
//!     Ok(Response::ok().with_body(format!("question {}", id)))
//! }
//!
//! let polls = UnifiedRouter::new()
//!     .with_namespace("polls")
//!     .path("{<int:question_id>}/", handler_fn(detail), "detail");
//! let root = UnifiedRouter::new().mount("/polls/", polls);
//!
//! assert_eq!(root.reverse("polls:detail", &[("question_id", "3")]).unwrap(), "/polls/3/");
//! ```

pub mod pattern;
pub mod reverse;
pub mod route;
pub mod router;

pub use pattern::{Converter, PathPattern, PatternError};
pub use reverse::{ReverseError, ReverseResult};
pub use route::Route;
pub use router::UnifiedRouter;
