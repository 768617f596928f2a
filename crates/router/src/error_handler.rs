use crate::body::ResponseBody;
use crate::error::HandlerError;
use crate::responder::plain_text;
use crate::RequestContext;
use http::{HeaderValue, Response};
use tracing::{debug, error};

/// Turns a failure of the pipeline into the response sent to the client.
///
/// Every request that does not produce a response of its own ends here, so an
/// implementation must always return one.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, req: &RequestContext, error: HandlerError) -> Response<ResponseBody>;
}

/// Answers with the failure's status and a short `text/plain` body.
///
/// Server errors are logged and their details are kept out of the body.
/// `405` responses carry the `Allow` header.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, req: &RequestContext, error: HandlerError) -> Response<ResponseBody> {
        let status = error.status_code();

        let body = if status.is_server_error() {
            error!(method = %req.method(), path = req.path(), status = status.as_u16(), cause = %error, "request failed");
            status.canonical_reason().unwrap_or("server error").to_owned()
        } else {
            debug!(method = %req.method(), path = req.path(), status = status.as_u16(), cause = %error, "request rejected");
            error.to_string()
        };

        let mut response = plain_text(status, ResponseBody::from(body));
        if let Some(allow) = error.allow_header()
            && let Ok(value) = HeaderValue::from_str(&allow)
        {
            response.headers_mut().insert(http::header::ALLOW, value);
        }
        response
    }
}
