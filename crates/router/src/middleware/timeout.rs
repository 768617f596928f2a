//! Deadline enforcement for a handler chain.
//!
//! The pipeline places a [`Timeout`] outside every other middleware of a route,
//! so the deadline bounds slow middleware as well as the handler itself. The
//! timeout also records a [`Deadline`] on the request, and the pipeline enforces
//! that same deadline again just inside the global middleware: when the handler
//! is what overruns, global middleware gets to see the `Timeout` failure instead
//! of being dropped with it.

use crate::error::HandlerError;
use crate::handler::{BoxedHandler, HandlerResult, RequestHandler};
use crate::middleware::Middleware;
use crate::RequestContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// The point in time by which the current request must be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    after: Duration,
}

impl Deadline {
    pub fn at(&self) -> Instant {
        self.at
    }

    /// The configured duration the deadline was derived from.
    pub fn after(&self) -> Duration {
        self.after
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    duration: Duration,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Middleware for Timeout {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        Arc::new(TimeoutHandler { handler, duration: self.duration })
    }
}

/// Races the inner handler against a deadline.
///
/// On expiry the inner future is dropped, the request's cancellation token for the
/// wrapped scope is cancelled and a single [`HandlerError::Timeout`] is returned.
pub struct TimeoutHandler {
    handler: BoxedHandler,
    duration: Duration,
}

impl std::fmt::Debug for TimeoutHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutHandler").field("duration", &self.duration).finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestHandler for TimeoutHandler {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        let own = Deadline { at: Instant::now() + self.duration, after: self.duration };
        let deadline = match req.deadline() {
            Some(outer) if outer.at <= own.at => outer,
            _ => own,
        };

        // a child token: the inner chain gets cancelled, the outer scope does not
        let scoped = req.cancellation_token().child_token();
        let outer_token = req.replace_cancellation_token(scoped.clone());
        let outer_deadline = req.replace_deadline(Some(deadline));

        let result = tokio::time::timeout_at(deadline.at, self.handler.invoke(req)).await;
        req.replace_cancellation_token(outer_token);
        req.replace_deadline(outer_deadline);

        result.unwrap_or_else(|_elapsed| {
            scoped.cancel();
            warn!(path = req.path(), timeout = ?deadline.after, "request timed out");
            Err(HandlerError::Timeout { after: deadline.after })
        })
    }
}

/// Enforces the request's [`Deadline`], if one was set further out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EnforceDeadline;

impl Middleware for EnforceDeadline {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        Arc::new(EnforceDeadlineHandler { handler })
    }
}

struct EnforceDeadlineHandler {
    handler: BoxedHandler,
}

#[async_trait]
impl RequestHandler for EnforceDeadlineHandler {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        let Some(deadline) = req.deadline() else {
            return self.handler.invoke(req).await;
        };

        match tokio::time::timeout_at(deadline.at, self.handler.invoke(req)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                req.cancellation_token().cancel();
                warn!(path = req.path(), timeout = ?deadline.after, "request timed out");
                Err(HandlerError::Timeout { after: deadline.after })
            }
        }
    }
}
