//! Error types for route registration and request handling.
//!
//! Registration problems ([`PatternError`], [`RouteError`]) surface while the
//! application is being built. Request failures ([`HandlerError`]) are ordinary
//! values returned through the handler chain and turned into a response by the
//! application's [`ErrorHandler`](crate::ErrorHandler).

use http::StatusCode;
use std::error::Error;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("wildcard must be the last segment in pattern '{pattern}'")]
    InvalidWildcardPosition { pattern: String },

    #[error("parameter '{name}' is bound more than once in pattern '{pattern}'")]
    DuplicateParamName { pattern: String, name: String },

    #[error("parameter without a name in pattern '{pattern}'")]
    EmptyParamName { pattern: String },

    #[error("invalid host pattern '{pattern}': {reason}")]
    InvalidHost { pattern: String, reason: String },
}

impl PatternError {
    pub fn invalid_wildcard_position<S: ToString>(pattern: S) -> Self {
        Self::InvalidWildcardPosition { pattern: pattern.to_string() }
    }

    pub fn duplicate_param_name<S: ToString, N: ToString>(pattern: S, name: N) -> Self {
        Self::DuplicateParamName { pattern: pattern.to_string(), name: name.to_string() }
    }

    pub fn empty_param_name<S: ToString>(pattern: S) -> Self {
        Self::EmptyParamName { pattern: pattern.to_string() }
    }

    pub fn invalid_host<S: ToString, R: ToString>(pattern: S, reason: R) -> Self {
        Self::InvalidHost { pattern: pattern.to_string(), reason: reason.to_string() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route pattern: {source}")]
    Pattern {
        #[from]
        source: PatternError,
    },

    #[error("invalid http method '{method}'")]
    InvalidMethod { method: String },

    #[error("route name '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("route '{method} {host}{path}' is already registered")]
    DuplicateRoute { method: String, host: String, path: String },
}

impl RouteError {
    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn duplicate_name<S: ToString>(name: S) -> Self {
        Self::DuplicateName { name: name.to_string() }
    }
}

/// A failure produced while handling a request.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("no route matches the request")]
    NotFound,

    #[error("method not allowed, allowed: {}", allowed.join(", "))]
    MethodNotAllowed { allowed: Vec<String> },

    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },

    #[error("{status}: {reason}")]
    Status { status: StatusCode, reason: String },

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    pub fn method_not_allowed<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MethodNotAllowed { allowed: allowed.into_iter().map(Into::into).collect() }
    }

    pub fn bad_request<S: ToString>(reason: S) -> Self {
        Self::BadRequest { reason: reason.to_string() }
    }

    pub fn internal<S: ToString>(reason: S) -> Self {
        Self::Internal { reason: reason.to_string() }
    }

    pub fn status<S: ToString>(status: StatusCode, reason: S) -> Self {
        Self::Status { status, reason: reason.to_string() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NotFound => StatusCode::NOT_FOUND,
            HandlerError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            HandlerError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HandlerError::Status { status, .. } => *status,
            HandlerError::Internal { .. } | HandlerError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The value of the `Allow` header a 405 response should carry.
    pub fn allow_header(&self) -> Option<String> {
        match self {
            HandlerError::MethodNotAllowed { allowed } => Some(allowed.join(", ")),
            _ => None,
        }
    }
}

impl From<http::Error> for HandlerError {
    fn from(e: http::Error) -> Self {
        HandlerError::Other(Box::new(e))
    }
}

impl From<http::method::InvalidMethod> for HandlerError {
    fn from(e: http::method::InvalidMethod) -> Self {
        HandlerError::bad_request(e)
    }
}

impl From<Box<dyn Error + Send + Sync>> for HandlerError {
    fn from(e: Box<dyn Error + Send + Sync>) -> Self {
        HandlerError::Other(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(HandlerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(HandlerError::method_not_allowed(["GET"]).status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(HandlerError::Timeout { after: Duration::from_millis(5) }.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(HandlerError::status(StatusCode::CONFLICT, "taken").status_code(), StatusCode::CONFLICT);
        assert_eq!(HandlerError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn allow_header_is_comma_space_joined() {
        let error = HandlerError::method_not_allowed(["GET", "POST"]);
        assert_eq!(error.allow_header().as_deref(), Some("GET, POST"));
        assert_eq!(error.to_string(), "method not allowed, allowed: GET, POST");
        assert_eq!(HandlerError::NotFound.allow_header(), None);
    }
}
