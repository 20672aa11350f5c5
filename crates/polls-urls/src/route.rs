use polls_http::{Handler, Method};
use std::sync::Arc;

use crate::pattern::{PathPattern, PatternError};

/// Route definition
///
/// Combines a path pattern with a handler, an optional name and the HTTP methods
/// it answers. An empty method list accepts every method. Similar to Django's
/// `URLPattern`.
#[derive(Clone)]
pub struct Route {
	pub pattern: PathPattern,
	handler: Arc<dyn Handler>,
	pub name: Option<String>,
	/// Namespace the route was registered under, e.g. `polls` or `admin`
	pub namespace: Option<String>,
	pub methods: Vec<Method>,
}

impl Route {
	/// Create a new route
	///
	/// # Examples
	///
	/// ```
	/// use polls_http::{Method, Request, Response, Result, handler_fn};
	/// use polls_urls::Route;
	/// use std::sync::Arc;
	///
	/// async fn vote(_request: Request) -> Result<Response> {
	///     Ok(Response::ok())
	/// }
	///
	/// let route = Route::new("/polls/{<int:question_id>}/vote/", Arc::new(handler_fn(vote)))
	///     .unwrap()
	///     .with_name("vote")
	///     .with_methods(&[Method::GET, Method::POST]);
	/// assert!(route.allows(&Method::POST));
	/// assert!(!route.allows(&Method::DELETE));
	/// ```
	pub fn new(pattern: &str, handler: Arc<dyn Handler>) -> Result<Self, PatternError> {
		Ok(Self {
			pattern: PathPattern::new(pattern)?,
			handler,
			name: None,
			namespace: None,
			methods: Vec::new(),
		})
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}

	pub fn with_methods(mut self, methods: &[Method]) -> Self {
		self.methods = methods.to_vec();
		self
	}

	pub fn handler(&self) -> Arc<dyn Handler> {
		self.handler.clone()
	}

	/// `namespace:name`, or just the name when the route has no namespace
	pub fn full_name(&self) -> Option<String> {
		let name = self.name.as_ref()?;
		Some(match &self.namespace {
			Some(namespace) => format!("{}:{}", namespace, name),
			None => name.clone(),
		})
	}

	/// HEAD is answered wherever GET is
	pub fn allows(&self, method: &Method) -> bool {
		self.methods.is_empty()
			|| self.methods.contains(method)
			|| (*method == Method::HEAD && self.methods.contains(&Method::GET))
	}
}
