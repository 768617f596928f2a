use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use micro_router::app::{any, delete, get, post, put};
use micro_router::config::RouterConfig;
use micro_router::hook::MethodOverride;
use micro_router::middleware::{Middleware, Recover};
use micro_router::{
    App, BoxedHandler, HandlerError, HandlerResult, RequestContext, RequestHandler, ResponseBody, SharedApp,
    handler_fn,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records the status of every response leaving the chain, 404s and 405s included.
#[derive(Clone, Default)]
struct AccessLog {
    lines: Arc<Mutex<Vec<String>>>,
}

struct AccessLogHandler {
    lines: Arc<Mutex<Vec<String>>>,
    next: BoxedHandler,
}

impl Middleware for AccessLog {
    fn decorate(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(AccessLogHandler { lines: Arc::clone(&self.lines), next })
    }
}

#[async_trait]
impl RequestHandler for AccessLogHandler {
    async fn invoke(&self, req: &mut RequestContext) -> HandlerResult {
        let result = self.next.invoke(req).await;
        let status = match &result {
            Ok(response) => response.status(),
            Err(error) => error.status_code(),
        };
        self.lines.lock().unwrap().push(format!("{} {} {}", req.method(), req.path(), status.as_u16()));
        result
    }
}

fn show_user() -> impl RequestHandler + 'static {
    handler_fn(|req: &RequestContext| {
        let id = req.param("id").map(str::to_owned);
        async move {
            match id.as_deref() {
                Some("0") => Err(HandlerError::NotFound),
                Some(id) => Ok(format!("user {id}")),
                None => Err(HandlerError::bad_request("missing id")),
            }
        }
    })
}

fn text(body: &'static str) -> impl RequestHandler + 'static {
    handler_fn(move |_req: &RequestContext| async move { body })
}

fn build(log: &AccessLog) -> App {
    let config: RouterConfig = serde_json::from_str(r#"{ "duplicate_name": "skip", "default_timeout_ms": 1000 }"#).unwrap();

    App::builder()
        .config(config)
        .pre_routing(MethodOverride::new())
        .wrap(log.clone())
        .wrap(Recover)
        .route("/", get(text("home")).name("home"))
        .group("/api/v1", |v1| {
            v1.route("/users", get(text("all users")).name("users.index"))
                .route("/users", post(text("created")).name("users.create"))
                .route("/users/:id", get(show_user()).name("users.show"))
                .route("/users/:id", put(text("updated")))
                .route("/users/:id", delete(text("deleted")))
                .route("/users/me", get(text("current user")))
        })
        .route("/static/*file", get(text("file")).name("static"))
        .route("/webhooks/*rest", any(text("hook")))
        .route("/", get(text("tenant home")).host("*.example.com"))
        .build()
        .unwrap()
}

fn request(method: Method, uri: &str) -> Request<Bytes> {
    Request::builder().method(method).uri(uri).header(http::header::HOST, "localhost:8080").body(Bytes::new()).unwrap()
}

async fn body_text(response: Response<ResponseBody>) -> String {
    String::from_utf8(response.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap()
}

#[tokio::test]
async fn serves_a_small_api() {
    let log = AccessLog::default();
    let app = build(&log);

    assert_eq!(body_text(app.dispatch(request(Method::GET, "/")).await).await, "home");
    assert_eq!(body_text(app.dispatch(request(Method::GET, "/api/v1/users/me")).await).await, "current user");
    assert_eq!(body_text(app.dispatch(request(Method::GET, "/api/v1/users/7")).await).await, "user 7");
    assert_eq!(body_text(app.dispatch(request(Method::PATCH, "/webhooks/a/b")).await).await, "hook");

    let response = app.dispatch(request(Method::GET, "/api/v1/users/0")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.dispatch(request(Method::PATCH, "/api/v1/users/7")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[http::header::ALLOW], "DELETE, GET, PUT");

    let response = app.dispatch(request(Method::GET, "/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        *log.lines.lock().unwrap(),
        vec![
            "GET / 200",
            "GET /api/v1/users/me 200",
            "GET /api/v1/users/7 200",
            "PATCH /webhooks/a/b 200",
            "GET /api/v1/users/0 404",
            "PATCH /api/v1/users/7 405",
            "GET /missing 404",
        ]
    );
}

#[tokio::test]
async fn host_specific_routes_win() {
    let app = build(&AccessLog::default());

    let request = Request::builder().uri("/").header(http::header::HOST, "acme.example.com").body(Bytes::new()).unwrap();
    assert_eq!(body_text(app.dispatch(request).await).await, "tenant home");
}

#[tokio::test]
async fn html_forms_can_delete() {
    let app = build(&AccessLog::default());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/7")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Bytes::from_static(b"_method=DELETE"))
        .unwrap();
    assert_eq!(body_text(app.dispatch(request).await).await, "deleted");
}

#[test]
fn reverse_routing_and_introspection() {
    let app = build(&AccessLog::default());

    let params = HashMap::from([("id", "a b")]);
    assert_eq!(app.path("users.show", &params).as_deref(), Some("/api/v1/users/a%20b"));
    assert_eq!(app.path("users.show", &HashMap::<&str, &str>::new()), None);

    let file = HashMap::from([("file", "/css/site.css")]);
    let query = HashMap::from([("v", "3"), ("lang", "en")]);
    assert_eq!(app.path_with_query("static", &file, &query).as_deref(), Some("/static/css/site.css?lang=en&v=3"));

    let routes = app.routes();
    assert_eq!(routes.len(), 10);
    assert!(routes.iter().all(|route| route.timeout_ms == Some(1000)));
    assert_eq!(routes[3].path, "/api/v1/users/:id");
    assert_eq!(routes[3].params, vec!["id"]);
}

#[tokio::test]
async fn swapping_the_app() {
    let shared = SharedApp::new(build(&AccessLog::default()));
    assert_eq!(shared.dispatch(request(Method::GET, "/api/v1/users")).await.status(), StatusCode::OK);

    shared.store(App::builder().route("/", get(text("maintenance"))).build().unwrap());
    assert_eq!(shared.dispatch(request(Method::GET, "/api/v1/users")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(shared.dispatch(request(Method::GET, "/")).await).await, "maintenance");
    assert!(shared.load().route_table().lookup_by_name("home").is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_routes_time_out() {
    let app = App::builder()
        .route(
            "/report",
            get(handler_fn(|_req: &RequestContext| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "report"
            }))
            .timeout(Duration::from_millis(50)),
        )
        .build()
        .unwrap();

    let response = app.dispatch(request(Method::GET, "/report")).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}
