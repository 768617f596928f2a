use bytes::Bytes;
use http::{Method, Request};
use http_body_util::BodyExt;
use micro_router::app::{get, post};
use micro_router::hook::MethodOverride;
use micro_router::middleware::Recover;
use micro_router::{App, RequestContext, handler_fn};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

async fn hello() -> &'static str {
    "hello world"
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let app = App::builder()
        .pre_routing(MethodOverride::new())
        .wrap(Recover)
        .route("/", get(handler_fn(|_req: &RequestContext| hello())))
        .group("/users", |users| {
            users
                .route(
                    "/:id",
                    get(handler_fn(|req: &RequestContext| {
                        let id = req.param("id").unwrap_or_default().to_owned();
                        async move { format!("user {id}\r\n") }
                    }))
                    .name("user.show"),
                )
                .route("/", post(handler_fn(|_req: &RequestContext| async { "created\r\n" })))
        })
        .route(
            "/slow",
            get(handler_fn(|_req: &RequestContext| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "finally\r\n"
            }))
            .timeout(Duration::from_millis(100)),
        )
        .build()
        .expect("routes should be valid");

    for (method, uri) in [(Method::GET, "/"), (Method::GET, "/users/42"), (Method::DELETE, "/users/42"), (Method::GET, "/slow")] {
        let request = Request::builder().method(method.clone()).uri(uri).body(Bytes::new()).expect("valid request");
        let response = app.dispatch(request).await;
        let status = response.status();
        let allow = response.headers().get(http::header::ALLOW).cloned();
        let body = response.into_body().collect().await.map(|collected| collected.to_bytes()).unwrap_or_default();
        info!(%method, uri, %status, ?allow, body = %String::from_utf8_lossy(&body), "dispatched");
    }

    let params = HashMap::from([("id", "42")]);
    info!(path = ?app.path("user.show", &params), "reverse routed");
    info!(routes = %serde_json::to_string_pretty(&app.routes()).unwrap_or_default(), "registered routes");
}
