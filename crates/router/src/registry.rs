use crate::error::RouteError;
use crate::handler::BoxedHandler;
use crate::matcher::{MatchResult, Matcher};
use crate::pattern::{HostPattern, compile_host, compile_path};
use crate::route::{Route, RouteId, RouteMethod, RouteOptions};
use http::Method;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Owns every registered [`Route`], the name index and the [`Matcher`].
///
/// Routes are only added while the application is being set up, after that the
/// table is read-only.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    names: HashMap<String, RouteId>,
    matcher: Matcher,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host-agnostic route. `method` is an HTTP method name or `*`.
    pub fn add(
        &mut self,
        method: &str,
        path: &str,
        handler: BoxedHandler,
        options: RouteOptions,
    ) -> Result<RouteId, RouteError> {
        self.insert(method.parse()?, HostPattern::Any, path, handler, options)
    }

    pub fn add_with_host(
        &mut self,
        method: &str,
        host: &str,
        path: &str,
        handler: BoxedHandler,
        options: RouteOptions,
    ) -> Result<RouteId, RouteError> {
        let host = compile_host(host)?;
        self.insert(method.parse()?, host, path, handler, options)
    }

    pub(crate) fn insert(
        &mut self,
        method: RouteMethod,
        host: HostPattern,
        path: &str,
        handler: BoxedHandler,
        options: RouteOptions,
    ) -> Result<RouteId, RouteError> {
        let segments = compile_path(path)?;

        if let Some(name) = &options.name
            && self.names.contains_key(name)
        {
            warn!(name = name.as_str(), method = %method, path, "route name already registered, route rejected");
            return Err(RouteError::duplicate_name(name));
        }

        let id = RouteId(self.routes.len());
        self.matcher.insert(&method, &host, path, &segments, id)?;

        if let Some(name) = &options.name {
            self.names.insert(name.clone(), id);
        }

        debug!(route = %id, method = %method, host = %host, path, "route registered");
        let RouteOptions { name, middleware, timeout } = options;
        self.routes.push(Route { id, method, host, path: path.to_owned(), segments, name, middleware, timeout, handler });
        Ok(id)
    }

    /// Returns the route for an id handed out by this table.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different table.
    pub fn get(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }

    pub fn lookup(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<RouteId> {
        self.names.get(name).copied()
    }

    /// All routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn matches(&self, host: &str, method: &Method, path: &str) -> MatchResult {
        self.matcher.at(host, method, path)
    }
}
