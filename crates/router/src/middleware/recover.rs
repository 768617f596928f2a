use crate::error::HandlerError;
use crate::handler::{BoxedHandler, HandlerResult, RequestHandler};
use crate::middleware::Middleware;
use crate::RequestContext;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::error;

/// Turns a panic inside the wrapped chain into [`HandlerError::Internal`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Recover;

impl Middleware for Recover {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        Arc::new(RecoverHandler { handler })
    }
}

pub struct RecoverHandler {
    handler: BoxedHandler,
}

impl std::fmt::Debug for RecoverHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoverHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestHandler for RecoverHandler {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        let result = AssertUnwindSafe(self.handler.invoke(req)).catch_unwind().await;
        result.unwrap_or_else(|panic| {
            let reason = panic_message(panic.as_ref());
            error!(path = req.path(), reason = reason.as_str(), "handler panicked");
            Err(HandlerError::internal(reason))
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler_fn;
    use bytes::Bytes;
    use http::Request;

    #[tokio::test]
    async fn panic_becomes_internal_error() {
        let handler = handler_fn(|_req: &RequestContext| async {
            if true {
                panic!("boom");
            }
            "unreachable"
        });

        let recovered = Recover.decorate(Arc::new(handler));
        let mut ctx = RequestContext::new(Request::new(Bytes::new()));
        match recovered.invoke(&mut ctx).await {
            Err(HandlerError::Internal { reason }) => assert_eq!(reason, "boom"),
            other => panic!("expected an internal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_is_untouched() {
        let recovered = Recover.decorate(Arc::new(handler_fn(|_req: &RequestContext| async { "ok" })));
        let mut ctx = RequestContext::new(Request::new(Bytes::new()));
        assert!(recovered.invoke(&mut ctx).await.is_ok());
    }
}
