//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the core types for working with HTTP requests in the router:
//! - `RequestContext`: Provides access to the request, path parameters and per-request state
//! - `PathParams`: Handles URL path parameters extracted from request paths

use crate::matcher::normalize_host;
use crate::middleware::Deadline;
use crate::route::RouteId;
use bytes::Bytes;
use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Request, Uri, Version};
use tokio_util::sync::CancellationToken;

/// Represents the context of an HTTP request as it travels through the dispatch pipeline.
///
/// Pre-routing hooks see it before any route is resolved, so [`path_params`](Self::path_params)
/// is empty and [`route`](Self::route) is `None` at that point.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
    body: Bytes,
    path_params: PathParams,
    route: Option<RouteId>,
    cancellation: CancellationToken,
    deadline: Option<Deadline>,
}

impl RequestContext {
    pub fn new(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self { parts, body, path_params: PathParams::empty(), route: None, cancellation: CancellationToken::new(), deadline: None }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Replaces the method, used by pre-routing hooks such as method override.
    pub fn set_method(&mut self, method: Method) {
        self.parts.method = method;
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// The request host without port, lower-cased.
    ///
    /// Taken from the `Host` header, falling back to the URI authority.
    pub fn host(&self) -> String {
        let raw = self
            .parts
            .headers
            .get(http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| self.parts.uri.host())
            .unwrap_or_default();
        normalize_host(raw).into_owned()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Per-request values shared between hooks, middleware and handlers.
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Shortcut for `path_params().get(name)`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// The matched route, `None` before routing or when nothing matched.
    pub fn route(&self) -> Option<RouteId> {
        self.route
    }

    /// Cancelled when the request's deadline expires.
    ///
    /// Work spawned by a handler should watch this token to unwind promptly.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The deadline of the innermost enclosing timeout, if any.
    pub fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    pub(crate) fn bind_route(&mut self, route: RouteId, path_params: PathParams) {
        self.route = Some(route);
        self.path_params = path_params;
    }

    pub(crate) fn replace_cancellation_token(&mut self, token: CancellationToken) -> CancellationToken {
        std::mem::replace(&mut self.cancellation, token)
    }

    pub(crate) fn replace_deadline(&mut self, deadline: Option<Deadline>) -> Option<Deadline> {
        std::mem::replace(&mut self.deadline, deadline)
    }
}

impl From<Request<Bytes>> for RequestContext {
    fn from(request: Request<Bytes>) -> Self {
        RequestContext::new(request)
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Path parameters are named segments in the URL path that can be extracted and accessed
/// by name. For example, in the path "/users/:id", "id" is a path parameter.
/// Values are percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { inner: Vec::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.inner.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_from_header_or_uri() {
        let req = Request::builder().uri("/").header(http::header::HOST, "Example.com:8080").body(Bytes::new()).unwrap();
        assert_eq!(RequestContext::new(req).host(), "example.com");

        let req = Request::builder().uri("http://api.example.com/x").body(Bytes::new()).unwrap();
        assert_eq!(RequestContext::new(req).host(), "api.example.com");

        let req = Request::builder().uri("/x").body(Bytes::new()).unwrap();
        assert_eq!(RequestContext::new(req).host(), "");
    }

    #[test]
    fn stored_values() {
        #[derive(Debug, Clone, PartialEq)]
        struct UserId(u64);

        let mut ctx = RequestContext::new(Request::new(Bytes::new()));
        ctx.extensions_mut().insert(UserId(7));
        assert_eq!(ctx.extensions().get::<UserId>(), Some(&UserId(7)));
    }

    #[test]
    fn path_params_lookup() {
        let params = [("id".to_owned(), "42".to_owned())].into_iter().collect::<PathParams>();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("name"), None);
        assert_eq!(params.len(), 1);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("id", "42")]);
    }
}
