//! Middleware: functions that wrap a handler into another handler.
//!
//! A middleware usually decorates the handler with a struct implementing
//! [`RequestHandler`] that runs code around the inner call:
//!
//! ```
//! use async_trait::async_trait;
//! use micro_router::middleware::middleware_fn;
//! use micro_router::{BoxedHandler, HandlerResult, RequestContext, RequestHandler};
//! use std::sync::Arc;
//!
//! struct PoweredBy(BoxedHandler);
//!
//! #[async_trait]
//! impl RequestHandler for PoweredBy {
//!     async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
//!         let mut response = self.0.invoke(req).await?;
//!         response.headers_mut().insert("x-powered-by", "micro".parse().unwrap());
//!         Ok(response)
//!     }
//! }
//!
//! let powered_by = middleware_fn(|next| Arc::new(PoweredBy(next)) as BoxedHandler);
//! ```
//!
//! A [`MiddlewareChain`] composes an ordered list: the first middleware added is
//! the outermost one and observes the request first.

mod recover;
mod timeout;

pub use recover::{Recover, RecoverHandler};
pub(crate) use timeout::EnforceDeadline;
pub use timeout::{Deadline, Timeout, TimeoutHandler};

use crate::handler::BoxedHandler;
use std::fmt;
use std::sync::Arc;

pub trait Middleware: Send + Sync {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler;
}

pub type SharedMiddleware = Arc<dyn Middleware>;

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        (**self).decorate(handler)
    }
}

#[derive(Copy, Clone)]
pub struct MiddlewareFn<F> {
    f: F,
}

pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    MiddlewareFn { f }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        (self.f)(handler)
    }
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}

/// An ordered list of middleware, itself a middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    inner: Vec<SharedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a middleware inside the ones already in the chain.
    #[must_use]
    pub fn and_then<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.inner.push(Arc::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: SharedMiddleware) {
        self.inner.push(middleware);
    }

    pub fn extend<I: IntoIterator<Item = SharedMiddleware>>(&mut self, middleware: I) {
        self.inner.extend(middleware);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedMiddleware> {
        self.inner.iter()
    }
}

impl Middleware for MiddlewareChain {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        compose(handler, &self.inner)
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("len", &self.inner.len()).finish()
    }
}

impl From<Vec<SharedMiddleware>> for MiddlewareChain {
    fn from(inner: Vec<SharedMiddleware>) -> Self {
        Self { inner }
    }
}

/// Wraps `handler` with `middleware`, the first element ending up outermost.
pub fn compose(handler: BoxedHandler, middleware: &[SharedMiddleware]) -> BoxedHandler {
    middleware.iter().rev().fold(handler, |inner, middleware| middleware.decorate(inner))
}
