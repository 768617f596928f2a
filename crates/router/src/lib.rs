//! Request routing and dispatch for the micro web framework.
//!
//! Routes map `(host, method, path)` to a handler. Path patterns are made of
//! literal segments, `:name` parameters and a trailing `*name` wildcard; host
//! patterns are exact (`api.example.com`) or suffix wildcards (`*.example.com`).
//! Each route carries an ordered middleware list, an optional name for reverse
//! routing and an optional timeout.
//!
//! An [`App`] is built once with [`App::builder`] and then only read. Requests go
//! through pre-routing hooks, matching, the composed middleware chain and the
//! handler; any failure is turned into a response by the [`ErrorHandler`].

mod body;
mod handler;
mod registry;
mod request;
mod responder;
mod route;
mod shared;

pub mod app;
pub mod config;
pub mod error;
pub mod error_handler;
pub mod hook;
pub mod matcher;
pub mod middleware;
pub mod path_builder;
pub mod pattern;

pub use app::App;
pub use app::AppBuilder;
pub use body::BoxError;
pub use body::ResponseBody;
pub use error::HandlerError;
pub use error::PatternError;
pub use error::RouteError;
pub use error_handler::DefaultErrorHandler;
pub use error_handler::ErrorHandler;
pub use handler::handler_fn;
pub use handler::BoxedHandler;
pub use handler::FnHandler;
pub use handler::HandlerResult;
pub use handler::RequestHandler;
pub use registry::RouteTable;
pub use request::PathParams;
pub use request::RequestContext;
pub use responder::Responder;
pub use route::Route;
pub use route::RouteId;
pub use route::RouteInfo;
pub use route::RouteMethod;
pub use route::RouteOptions;
pub use shared::SharedApp;
