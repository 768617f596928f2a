use crate::error::RouteError;
use crate::handler::BoxedHandler;
use crate::middleware::SharedMiddleware;
use crate::pattern::{HostPattern, Segment};
use http::Method;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Opaque identifier of a registered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The method a route is registered for; `*` registers [`RouteMethod::Any`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Any,
    Exact(Method),
}

impl RouteMethod {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Exact(exact) => exact == method,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RouteMethod::Any => "*",
            RouteMethod::Exact(method) => method.as_str(),
        }
    }
}

impl FromStr for RouteMethod {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(RouteMethod::Any);
        }
        Method::from_bytes(s.to_ascii_uppercase().as_bytes())
            .map(RouteMethod::Exact)
            .map_err(|_| RouteError::invalid_method(s))
    }
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        RouteMethod::Exact(method)
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional metadata attached to a route at registration.
#[derive(Default, Clone)]
pub struct RouteOptions {
    pub name: Option<String>,
    pub middleware: Vec<SharedMiddleware>,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("name", &self.name)
            .field("middleware", &self.middleware.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A registered route, immutable once added to a [`RouteTable`](crate::RouteTable).
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) method: RouteMethod,
    pub(crate) host: HostPattern,
    pub(crate) path: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) name: Option<String>,
    pub(crate) middleware: Vec<SharedMiddleware>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) handler: BoxedHandler,
}

impl Route {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    pub fn host(&self) -> &HostPattern {
        &self.host
    }

    /// The path pattern as registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn middleware(&self) -> &[SharedMiddleware] {
        &self.middleware
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Serializable summary, used to feed API documentation generators.
    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            method: self.method.to_string(),
            host: match &self.host {
                HostPattern::Any => None,
                host => Some(host.to_string()),
            },
            path: self.path.clone(),
            params: self.segments.iter().filter_map(Segment::binder).map(ToOwned::to_owned).collect(),
            name: self.name.clone(),
            middleware: self.middleware.len(),
            timeout_ms: self.timeout.map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("middleware", &self.middleware.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub path: String,
    pub params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub middleware: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}
