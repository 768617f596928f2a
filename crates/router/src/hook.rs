//! Hooks that run before a request is routed.

use crate::error::HandlerError;
use crate::RequestContext;
use async_trait::async_trait;
use http::{HeaderName, Method};
use tracing::debug;

/// Runs before route matching. A hook may rewrite the request or fail it, in which
/// case routing is skipped and the failure goes to the error handler.
#[async_trait]
pub trait PreRoutingHook: Send + Sync {
    async fn before_routing(&self, req: &mut RequestContext) -> Result<(), HandlerError>;
}

/// Lets `POST` requests declare the method they stand for.
///
/// Looks at the `X-HTTP-Method-Override` header first, then at the `_method` field
/// of an `application/x-www-form-urlencoded` body. HTML forms can only send `GET`
/// and `POST`, this is how they reach `PUT` and `DELETE` routes.
#[derive(Debug, Clone)]
pub struct MethodOverride {
    header: HeaderName,
    field: String,
}

pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

impl MethodOverride {
    pub fn new() -> Self {
        Self { header: HeaderName::from_static(METHOD_OVERRIDE_HEADER), field: "_method".to_owned() }
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    fn requested_method(&self, req: &RequestContext) -> Result<Option<String>, HandlerError> {
        if let Some(value) = req.headers().get(&self.header) {
            let value = value.to_str().map_err(HandlerError::bad_request)?;
            return Ok(Some(value.to_owned()));
        }

        let is_form = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref()));
        if !is_form {
            return Ok(None);
        }

        let fields = serde_urlencoded::from_bytes::<Vec<(String, String)>>(req.body())
            .map_err(HandlerError::bad_request)?;
        Ok(fields.into_iter().find(|(name, _)| *name == self.field).map(|(_, value)| value))
    }
}

impl Default for MethodOverride {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreRoutingHook for MethodOverride {
    async fn before_routing(&self, req: &mut RequestContext) -> Result<(), HandlerError> {
        if req.method() != Method::POST {
            return Ok(());
        }

        if let Some(requested) = self.requested_method(req)? {
            let method = Method::from_bytes(requested.trim().to_ascii_uppercase().as_bytes())?;
            debug!(from = %req.method(), to = %method, path = req.path(), "method overridden");
            req.set_method(method);
        }
        Ok(())
    }
}
