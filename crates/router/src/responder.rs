//! Response handling module that converts handler results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into the result of a handler. It includes implementations for
//! common types like Result, Option, String, etc.

use crate::body::ResponseBody;
use crate::error::HandlerError;
use crate::handler::HandlerResult;
use crate::RequestContext;
use http::{HeaderValue, Response, StatusCode};
use std::convert::Infallible;

/// A trait for types that can be returned from handlers created by
/// [`handler_fn`](crate::handler_fn).
pub trait Responder {
    fn response_to(self, req: &RequestContext) -> HandlerResult;
}

/// `Err` values become failures of the handler chain and end up in the error handler.
impl<T: Responder, E: Into<HandlerError>> Responder for Result<T, E> {
    fn response_to(self, req: &RequestContext) -> HandlerResult {
        match self {
            Ok(t) => t.response_to(req),
            Err(e) => Err(e.into()),
        }
    }
}

/// `None` is answered with `404 Not Found`.
impl<T: Responder> Responder for Option<T> {
    fn response_to(self, req: &RequestContext) -> HandlerResult {
        match self {
            Some(t) => t.response_to(req),
            None => Err(HandlerError::NotFound),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<ResponseBody>,
{
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        Ok(self.map(Into::into))
    }
}

/// Implementation for (StatusCode, T) tuple allows setting a status code
/// along with the response content.
impl<T: Responder> Responder for (StatusCode, T) {
    fn response_to(self, req: &RequestContext) -> HandlerResult {
        let (status, responder) = self;
        let mut response = responder.response_to(req)?;
        *response.status_mut() = status;
        Ok(response)
    }
}

impl<T: Responder> Responder for Box<T> {
    fn response_to(self, req: &RequestContext) -> HandlerResult {
        (*self).response_to(req)
    }
}

impl Responder for () {
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        Ok(Response::new(ResponseBody::empty()))
    }
}

impl Responder for &'static str {
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        Ok(plain_text(StatusCode::OK, ResponseBody::from(self)))
    }
}

impl Responder for String {
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        Ok(plain_text(StatusCode::OK, ResponseBody::from(self)))
    }
}

impl Responder for HandlerError {
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        Err(self)
    }
}

impl Responder for Infallible {
    fn response_to(self, _req: &RequestContext) -> HandlerResult {
        match self {}
    }
}

pub(crate) fn plain_text(status: StatusCode, body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(http::header::CONTENT_TYPE, HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()));
    response
}
