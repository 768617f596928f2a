use crate::body::ResponseBody;
use crate::error::HandlerError;
use crate::responder::Responder;
use crate::RequestContext;
use async_trait::async_trait;
use http::Response;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

pub type HandlerResult = Result<Response<ResponseBody>, HandlerError>;

/// A shared, type-erased handler. Composed middleware chains are stored this way.
pub type BoxedHandler = Arc<dyn RequestHandler>;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult;
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Arc<H> {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        (**self).invoke(req).await
    }
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        (**self).invoke(req).await
    }
}

/// a holder which represents an async fn taking the request context
///
/// The future must not borrow the context, so copy what the handler needs out of it first:
///
/// ```
/// use micro_router::{handler_fn, RequestContext};
///
/// let handler = handler_fn(|req: &RequestContext| {
///     let id = req.param("id").unwrap_or_default().to_owned();
///     async move { format!("user {id}") }
/// });
/// ```
pub struct FnHandler<F, Fut> {
    f: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(&RequestContext) -> Fut,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(&RequestContext) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    FnHandler::new(f)
}

impl<F, Fut> fmt::Debug for FnHandler<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F, Fut>
where
    F: Fn(&RequestContext) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        let responder = (self.f)(req).await;
        responder.response_to(req)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;
    use http::{Request, StatusCode};

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    #[test]
    fn fn_is_handler() {
        let handler = handler_fn(|_req: &RequestContext| async { "hello" });
        assert_is_handler(&handler);

        let boxed: BoxedHandler = Arc::new(handler);
        assert_is_handler(&boxed);
    }

    #[tokio::test]
    async fn invoke_fn_handler() {
        let handler = handler_fn(|req: &RequestContext| {
            let method = req.method().clone();
            async move { format!("hello {method}") }
        });

        let mut ctx = RequestContext::new(Request::new(Bytes::new()));
        let response = handler.invoke(&mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn failure_is_returned() {
        let handler = handler_fn(|_req: &RequestContext| async { Err::<String, _>(HandlerError::internal("db down")) });

        let mut ctx = RequestContext::new(Request::new(Bytes::new()));
        assert!(matches!(handler.invoke(&mut ctx).await, Err(HandlerError::Internal { .. })));
    }
}
