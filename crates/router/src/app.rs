//! The application object: a built route table plus the request pipeline around it.
//!
//! ```
//! use micro_router::{App, RequestContext, handler_fn};
//! use micro_router::app::{get, post};
//! use std::time::Duration;
//!
//! let app = App::builder()
//!     .route("/users/:id", get(handler_fn(|req: &RequestContext| {
//!         let id = req.param("id").unwrap_or_default().to_owned();
//!         async move { format!("user {id}") }
//!     })).name("user.show"))
//!     .group("/admin", |admin| {
//!         admin.route("/reports", post(handler_fn(|_req: &RequestContext| async { "queued" })).timeout(Duration::from_secs(5)))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let params = std::collections::HashMap::from([("id", "42")]);
//! assert_eq!(app.path("user.show", &params).as_deref(), Some("/users/42"));
//! ```

use crate::body::ResponseBody;
use crate::config::{DuplicateNamePolicy, RouterConfig};
use crate::error::{HandlerError, RouteError};
use crate::error_handler::{DefaultErrorHandler, ErrorHandler};
use crate::handler::{BoxedHandler, HandlerResult, RequestHandler};
use crate::hook::PreRoutingHook;
use crate::matcher::MatchResult;
use crate::middleware::{EnforceDeadline, Middleware, SharedMiddleware, Timeout, compose};
use crate::path_builder::{build_path, build_query};
use crate::registry::RouteTable;
use crate::route::{RouteInfo, RouteOptions};
use crate::RequestContext;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderValue, Request, Response};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// A built application. Immutable, cheap to share between tasks.
pub struct App {
    table: RouteTable,
    /// Composed chain per route, indexed by route id.
    chains: Vec<BoxedHandler>,
    /// Global middleware around a stub that fails with the routing failure.
    unrouted: BoxedHandler,
    hooks: Vec<Arc<dyn PreRoutingHook>>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Runs a request through the pipeline. Failures are answered by the error handler,
    /// so every request gets exactly one response.
    ///
    /// A `405` always leaves with an `Allow` header; one set by the error handler is kept.
    pub async fn dispatch(&self, request: Request<Bytes>) -> Response<ResponseBody> {
        let mut req = RequestContext::new(request);
        match self.handle(&mut req).await {
            Ok(response) => response,
            Err(error) => {
                let allow = error.allow_header();
                let mut response = self.error_handler.handle(&req, error);
                if let Some(allow) = allow
                    && let Ok(value) = HeaderValue::from_str(&allow)
                {
                    response.headers_mut().entry(http::header::ALLOW).or_insert(value);
                }
                response
            }
        }
    }

    /// Runs the pipeline without the error handler.
    pub async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        for hook in &self.hooks {
            hook.before_routing(req).await?;
        }

        let host = req.host();
        match self.table.matches(&host, req.method(), req.path()) {
            MatchResult::Matched { route, params } => {
                debug!(route = %route, method = %req.method(), host = host.as_str(), path = req.path(), "route matched");
                let chain = self
                    .chains
                    .get(route.0)
                    .ok_or_else(|| HandlerError::internal(format!("no handler chain for route {route}")))?;
                req.bind_route(route, params);
                chain.invoke(req).await
            }
            MatchResult::MethodMismatch { allowed } => {
                debug!(method = %req.method(), host = host.as_str(), path = req.path(), allowed = ?allowed, "method not allowed");
                req.extensions_mut().insert(RoutingFailure::MethodNotAllowed(allowed));
                self.unrouted.invoke(req).await
            }
            MatchResult::NoMatch => {
                debug!(method = %req.method(), host = host.as_str(), path = req.path(), "no route matched");
                req.extensions_mut().insert(RoutingFailure::NotFound);
                self.unrouted.invoke(req).await
            }
        }
    }

    /// Builds the path of the route registered as `name`.
    ///
    /// `None` when no route has that name or a parameter the pattern needs is missing.
    pub fn path<K, V, S>(&self, name: &str, params: &HashMap<K, V, S>) -> Option<String>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
    {
        let id = self.table.lookup_by_name(name)?;
        build_path(self.table.get(id).segments(), params)
    }

    /// Like [`path`](Self::path), with `query` appended in key order.
    pub fn path_with_query<K, V, S, Q, W, T>(
        &self,
        name: &str,
        params: &HashMap<K, V, S>,
        query: &HashMap<Q, W, T>,
    ) -> Option<String>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
        Q: AsRef<str>,
        W: AsRef<str>,
    {
        self.path(name, params).map(|path| build_query(&path, query))
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.table
    }

    /// Summaries of all routes in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table.routes().iter().map(|route| route.info()).collect()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("table", &self.table).field("hooks", &self.hooks.len()).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum RoutingFailure {
    NotFound,
    MethodNotAllowed(Vec<String>),
}

struct Unrouted;

#[async_trait]
impl RequestHandler for Unrouted {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        match req.extensions().get::<RoutingFailure>().cloned() {
            Some(RoutingFailure::MethodNotAllowed(allowed)) => Err(HandlerError::MethodNotAllowed { allowed }),
            Some(RoutingFailure::NotFound) | None => Err(HandlerError::NotFound),
        }
    }
}

pub struct AppBuilder {
    routes: Vec<(String, RouteBuilder)>,
    middleware: Vec<SharedMiddleware>,
    hooks: Vec<Arc<dyn PreRoutingHook>>,
    error_handler: Arc<dyn ErrorHandler>,
    config: RouterConfig,
}

impl AppBuilder {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Vec::new(),
            hooks: Vec::new(),
            error_handler: Arc::new(DefaultErrorHandler),
            config: RouterConfig::default(),
        }
    }

    #[must_use]
    pub fn route(mut self, path: impl Into<String>, route: RouteBuilder) -> Self {
        self.routes.push((path.into(), route));
        self
    }

    /// Registers the routes of a group sharing `prefix`.
    #[must_use]
    pub fn group<F>(mut self, prefix: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(Group) -> Group,
    {
        self.routes.extend(f(Group::new(prefix.into())).into_routes());
        self
    }

    /// Adds global middleware. The first one added is the outermost.
    #[must_use]
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn pre_routing<H: PreRoutingHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn error_handler<E: ErrorHandler + 'static>(mut self, error_handler: E) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers every route and composes the handler chains.
    ///
    /// Invalid patterns and conflicting routes fail the build. Duplicate names follow
    /// [`RouterConfig::duplicate_name`].
    pub fn build(self) -> Result<App, RouteError> {
        let mut table = RouteTable::new();
        let default_timeout = self.config.default_timeout();

        for (path, route) in self.routes {
            let RouteBuilder { method, host, mut options, handler } = route;
            options.timeout = options.timeout.or(default_timeout);

            let added = match &host {
                Some(host) => table.add_with_host(&method, host, &path, handler, options),
                None => table.add(&method, &path, handler, options),
            };

            match added {
                Ok(_) => {}
                Err(RouteError::DuplicateName { .. }) if self.config.duplicate_name == DuplicateNamePolicy::Skip => {}
                Err(e) => {
                    error!(method = method.as_str(), path = path.as_str(), cause = %e, "failed to register route");
                    return Err(e);
                }
            }
        }

        let chains = table
            .routes()
            .iter()
            .map(|route| {
                let mut layers = Vec::with_capacity(self.middleware.len() + route.middleware().len() + 2);
                if let Some(timeout) = route.timeout() {
                    layers.push(Arc::new(Timeout::new(timeout)) as SharedMiddleware);
                }
                layers.extend(self.middleware.iter().cloned());
                if route.timeout().is_some() && !self.middleware.is_empty() {
                    layers.push(Arc::new(EnforceDeadline));
                }
                layers.extend(route.middleware().iter().cloned());
                compose(Arc::clone(route.handler()), &layers)
            })
            .collect();

        let unrouted = compose(Arc::new(Unrouted), &self.middleware);
        debug!(routes = table.len(), middleware = self.middleware.len(), hooks = self.hooks.len(), "app built");

        Ok(App { table, chains, unrouted, hooks: self.hooks, error_handler: self.error_handler })
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A route waiting to be registered, created by [`get`], [`post`] and friends.
pub struct RouteBuilder {
    method: String,
    host: Option<String>,
    options: RouteOptions,
    handler: BoxedHandler,
}

impl RouteBuilder {
    fn new<H: RequestHandler + 'static>(method: impl Into<String>, handler: H) -> Self {
        Self { method: method.into(), host: None, options: RouteOptions::default(), handler: Arc::new(handler) }
    }

    /// Names the route for reverse routing.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    /// Binds the route to a host: `api.example.com` or `*.example.com`.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Adds route middleware, inside the global and group middleware.
    #[must_use]
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.options.middleware.push(Arc::new(middleware));
        self
    }
}

impl fmt::Debug for RouteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("method", &self.method)
            .field("host", &self.host)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

macro_rules! method_route {
    ($fn_name:ident, $method:literal) => {
        #[doc = concat!("A `", $method, "` route.")]
        pub fn $fn_name<H: RequestHandler + 'static>(handler: H) -> RouteBuilder {
            RouteBuilder::new($method, handler)
        }
    };
}

method_route!(get, "GET");
method_route!(post, "POST");
method_route!(put, "PUT");
method_route!(delete, "DELETE");
method_route!(head, "HEAD");
method_route!(options, "OPTIONS");
method_route!(connect, "CONNECT");
method_route!(patch, "PATCH");
method_route!(trace, "TRACE");
method_route!(any, "*");

/// A route for an arbitrary method, e.g. `PURGE`. An invalid method fails the build.
pub fn method<H: RequestHandler + 'static>(method: impl Into<String>, handler: H) -> RouteBuilder {
    RouteBuilder::new(method, handler)
}

/// Routes sharing a path prefix, middleware and optionally a host.
pub struct Group {
    prefix: String,
    host: Option<String>,
    middleware: Vec<SharedMiddleware>,
    routes: Vec<(String, RouteBuilder)>,
}

impl Group {
    fn new(prefix: String) -> Self {
        Self { prefix, host: None, middleware: Vec::new(), routes: Vec::new() }
    }

    #[must_use]
    pub fn route(mut self, path: impl Into<String>, route: RouteBuilder) -> Self {
        self.routes.push((path.into(), route));
        self
    }

    /// Adds middleware to every route of the group, outside the routes' own middleware.
    #[must_use]
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Host for the routes of the group that don't set one.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn group<F>(mut self, prefix: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(Group) -> Group,
    {
        self.routes.extend(f(Group::new(prefix.into())).into_routes());
        self
    }

    fn into_routes(self) -> impl Iterator<Item = (String, RouteBuilder)> {
        let Group { prefix, host, middleware, routes } = self;
        routes.into_iter().map(move |(path, mut route)| {
            if route.host.is_none() {
                route.host.clone_from(&host);
            }
            route.options.middleware.splice(0..0, middleware.iter().cloned());
            (join_path(&prefix, &path), route)
        })
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("host", &self.host)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');

    let mut joined = String::with_capacity(prefix.len() + path.len() + 2);
    for part in [prefix, path] {
        if !part.is_empty() {
            joined.push('/');
            joined.push_str(part);
        }
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}
