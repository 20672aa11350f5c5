use async_trait::async_trait;
use polls_http::{Error, Handler, Method, Request, Response, Result};
use std::collections::HashMap;
use std::sync::Arc;

use crate::pattern::PatternError;
use crate::reverse::{ReverseError, ReverseResult};
use crate::route::Route;

/// Router holding an ordered list of routes
///
/// Routes are tried in registration order; the first pattern that matches the
/// path wins. A router can carry a namespace (`polls`, `admin`) and be mounted
/// under a prefix inside another router, mirroring Django's `include()`.
#[derive(Clone)]
pub struct UnifiedRouter {
	namespace: Option<String>,
	routes: Vec<Route>,
	append_slash: bool,
}

impl Default for UnifiedRouter {
	fn default() -> Self {
		Self::new()
	}
}

impl UnifiedRouter {
	pub fn new() -> Self {
		Self {
			namespace: None,
			routes: Vec::new(),
			append_slash: true,
		}
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		let namespace = namespace.into();
		for route in &mut self.routes {
			route.namespace = Some(namespace.clone());
		}
		self.namespace = Some(namespace);
		self
	}

	/// Redirect `/foo` to `/foo/` when only the latter resolves (on by default)
	pub fn with_append_slash(mut self, append_slash: bool) -> Self {
		self.append_slash = append_slash;
		self
	}

	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	/// Register a named route answering every method
	///
	/// # Panics
	///
	/// Panics if `pattern` is not a valid path pattern. Use [`Self::try_path`] for
	/// patterns that are not fixed at compile time.
	pub fn path<H>(self, pattern: &str, handler: H, name: &str) -> Self
	where
		H: Handler + 'static,
	{
		self.path_methods(pattern, handler, name, &[])
	}

	/// Register a named route restricted to `methods`
	///
	/// # Panics
	///
	/// Panics if `pattern` is not a valid path pattern.
	pub fn path_methods<H>(self, pattern: &str, handler: H, name: &str, methods: &[Method]) -> Self
	where
		H: Handler + 'static,
	{
		self.try_path_methods(pattern, Arc::new(handler), name, methods)
			.unwrap_or_else(|e| panic!("{}", e))
	}

	pub fn try_path(
		self,
		pattern: &str,
		handler: Arc<dyn Handler>,
		name: &str,
	) -> std::result::Result<Self, PatternError> {
		self.try_path_methods(pattern, handler, name, &[])
	}

	pub fn try_path_methods(
		self,
		pattern: &str,
		handler: Arc<dyn Handler>,
		name: &str,
		methods: &[Method],
	) -> std::result::Result<Self, PatternError> {
		let route = Route::new(&absolute(pattern), handler)?
			.with_name(name)
			.with_methods(methods);
		Ok(self.add_route(route))
	}

	pub fn add_route(mut self, mut route: Route) -> Self {
		if route.namespace.is_none() {
			route.namespace = self.namespace.clone();
		}
		self.routes.push(route);
		self
	}

	/// Mount every route of `child` under `prefix`
	///
	/// The child's namespace is nested inside this router's namespace, so a
	/// `polls` child mounted into a `site` router reverses as `site:polls:index`.
	///
	/// # Panics
	///
	/// Panics if `prefix` contains an invalid placeholder.
	pub fn mount(self, prefix: &str, child: UnifiedRouter) -> Self {
		self.try_mount(prefix, child)
			.unwrap_or_else(|e| panic!("{}", e))
	}

	pub fn try_mount(
		mut self,
		prefix: &str,
		child: UnifiedRouter,
	) -> std::result::Result<Self, PatternError> {
		let prefix = absolute(prefix);
		let prefix = prefix.trim_end_matches('/');

		for route in child.routes {
			let joined = format!("{}{}", prefix, route.pattern.as_str());
			let mut mounted = Route::new(&joined, route.handler())?.with_methods(&route.methods);
			mounted.name = route.name.clone();
			mounted.namespace = match (&self.namespace, &route.namespace) {
				(Some(outer), Some(inner)) => Some(format!("{}:{}", outer, inner)),
				(Some(outer), None) => Some(outer.clone()),
				(None, inner) => inner.clone(),
			};
			self.routes.push(mounted);
		}
		Ok(self)
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// First route whose pattern matches `path`, regardless of method
	pub fn resolve(&self, path: &str) -> Option<(&Route, HashMap<String, String>)> {
		self.routes
			.iter()
			.find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
	}

	/// Build the path of a named route
	///
	/// # Examples
	///
	/// ```
	/// use polls_http::{Request, Response, Result, handler_fn};
	/// use polls_urls::{ReverseError, UnifiedRouter};
	///
	/// async fn results(_request: Request) -> Result<Response> {
	///     Ok(Response::ok())
	/// }
	///
	/// let router = UnifiedRouter::new()
	///     .with_namespace("polls")
	///     .path("/polls/{<int:question_id>}/results/", handler_fn(results), "results");
	///
	/// assert_eq!(
	///     router.reverse("polls:results", &[("question_id", "5")]).unwrap(),
	///     "/polls/5/results/"
	/// );
	/// assert!(matches!(
	///     router.reverse("polls:results", &[("question_id", "five")]),
	///     Err(ReverseError::InvalidParameter { .. })
	/// ));
	/// ```
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> ReverseResult<String> {
		let route = self
			.routes
			.iter()
			.find(|route| route.full_name().as_deref() == Some(name))
			.ok_or_else(|| ReverseError::NoReverseMatch(name.to_string()))?;

		let params: HashMap<&str, &str> = params.iter().copied().collect();
		route
			.pattern
			.fill(&params)
			.map_err(|e| ReverseError::from_fill(name, e))
	}
}

fn absolute(pattern: &str) -> String {
	if pattern.starts_with('/') {
		pattern.to_string()
	} else {
		format!("/{}", pattern)
	}
}

#[async_trait]
impl Handler for UnifiedRouter {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();
		let mut path_matched = false;

		for route in &self.routes {
			let Some(params) = route.pattern.matches(&path) else {
				continue;
			};
			if !route.allows(&request.method) {
				path_matched = true;
				continue;
			}
			tracing::debug!(
				path = %path,
				route = route.full_name().as_deref().unwrap_or("-"),
				"resolved"
			);
			request.path_params = params;
			return route.handler().handle(request).await;
		}

		if path_matched {
			return Err(Error::MethodNotAllowed(format!(
				"{} {}",
				request.method, path
			)));
		}

		if self.append_slash && !path.ends_with('/') {
			let with_slash = format!("{}/", path);
			if self.resolve(&with_slash).is_some() {
				let location = match request.uri.query() {
					Some(query) => format!("{}?{}", with_slash, query),
					None => with_slash,
				};
				return Ok(Response::permanent_redirect(location));
			}
		}

		Err(Error::NotFound(path))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use polls_http::{StatusCode, handler_fn};
	use rstest::{fixture, rstest};

	async fn echo_params(request: Request) -> Result<Response> {
		let mut pairs: Vec<_> = request
			.path_params
			.iter()
			.map(|(k, v)| format!("{}={}", k, v))
			.collect();
		pairs.sort();
		Ok(Response::ok().with_body(pairs.join("&")))
	}

	#[fixture]
	fn router() -> UnifiedRouter {
		let polls = UnifiedRouter::new()
			.with_namespace("polls")
			.path("", handler_fn(echo_params), "index")
			.path("{<int:question_id>}/", handler_fn(echo_params), "detail")
			.path_methods(
				"{<int:question_id>}/vote/",
				handler_fn(echo_params),
				"vote",
				&[Method::GET, Method::POST],
			);
		UnifiedRouter::new().mount("/polls/", polls)
	}

	fn request(method: Method, uri: &str) -> Request {
		Request::builder().method(method).uri(uri).build().unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_dispatch_sets_path_params(router: UnifiedRouter) {
		// Act
		let response = router
			.handle(request(Method::GET, "/polls/34/"))
			.await
			.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, "question_id=34");
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_path_is_not_found(router: UnifiedRouter) {
		let result = router.handle(request(Method::GET, "/polls/abc/")).await;

		assert!(matches!(result, Err(Error::NotFound(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_wrong_method_is_not_allowed(router: UnifiedRouter) {
		let result = router
			.handle(request(Method::DELETE, "/polls/1/vote/"))
			.await;

		assert!(matches!(result, Err(Error::MethodNotAllowed(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_trailing_slash_redirects(router: UnifiedRouter) {
		let response = router
			.handle(request(Method::GET, "/polls/1?x=1"))
			.await
			.unwrap();

		assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
		assert_eq!(response.location(), Some("/polls/1/?x=1"));
	}

	#[rstest]
	#[case("polls:index", &[], "/polls/")]
	#[case("polls:detail", &[("question_id", "7")], "/polls/7/")]
	#[case("polls:vote", &[("question_id", "7")], "/polls/7/vote/")]
	fn test_reverse(
		router: UnifiedRouter,
		#[case] name: &str,
		#[case] params: &[(&str, &str)],
		#[case] expected: &str,
	) {
		assert_eq!(router.reverse(name, params).unwrap(), expected);
	}

	#[rstest]
	fn test_reverse_errors(router: UnifiedRouter) {
		assert_eq!(
			router.reverse("polls:missing", &[]),
			Err(ReverseError::NoReverseMatch("polls:missing".into()))
		);
		assert!(matches!(
			router.reverse("polls:detail", &[]),
			Err(ReverseError::MissingParameter { .. })
		));
		assert!(matches!(
			router.reverse("polls:detail", &[("question_id", "../1")]),
			Err(ReverseError::InvalidParameter { .. })
		));
	}

	#[rstest]
	fn test_nested_namespaces() {
		let inner = UnifiedRouter::new()
			.with_namespace("polls")
			.path("", handler_fn(echo_params), "index");
		let outer = UnifiedRouter::new()
			.with_namespace("site")
			.mount("/polls/", inner);

		assert_eq!(outer.reverse("site:polls:index", &[]).unwrap(), "/polls/");
	}
}
