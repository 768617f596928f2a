use crate::app::App;
use crate::body::ResponseBody;
use arc_swap::ArcSwap;
use bytes::Bytes;
use http::{Request, Response};
use std::sync::Arc;
use tracing::info;

/// An [`App`] that can be replaced while serving.
///
/// Routes of a built `App` never change. To change them, build a new `App` and
/// [`store`](Self::store) it: requests already in flight finish on the snapshot
/// they started with, new requests see the new one.
#[derive(Debug)]
pub struct SharedApp {
    current: ArcSwap<App>,
}

impl SharedApp {
    pub fn new(app: App) -> Self {
        Self { current: ArcSwap::from_pointee(app) }
    }

    /// The current snapshot.
    pub fn load(&self) -> Arc<App> {
        self.current.load_full()
    }

    pub fn store(&self, app: App) {
        let routes = app.route_table().len();
        self.current.store(Arc::new(app));
        info!(routes, "routes replaced");
    }

    pub async fn dispatch(&self, request: Request<Bytes>) -> Response<ResponseBody> {
        let app = self.load();
        app.dispatch(request).await
    }
}

impl From<App> for SharedApp {
    fn from(app: App) -> Self {
        SharedApp::new(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::get;
    use crate::{RequestContext, handler_fn};
    use http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use tokio::sync::oneshot;

    fn app(body: &'static str) -> App {
        App::builder().route("/", get(handler_fn(move |_req: &RequestContext| async move { body }))).build().unwrap()
    }

    fn request(uri: &str) -> Request<Bytes> {
        Request::builder().method(Method::GET).uri(uri).body(Bytes::new()).unwrap()
    }

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn store_replaces_the_routes() {
        let shared = SharedApp::new(app("v1"));
        assert_eq!(body_text(shared.dispatch(request("/")).await).await, "v1");

        shared.store(
            App::builder()
                .route("/v2", get(handler_fn(|_req: &RequestContext| async { "v2" })))
                .build()
                .unwrap(),
        );
        assert_eq!(shared.dispatch(request("/")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(shared.dispatch(request("/v2")).await).await, "v2");
    }

    #[tokio::test]
    async fn in_flight_requests_keep_their_snapshot() {
        let (started_tx, started) = oneshot::channel::<()>();
        let (release, released) = oneshot::channel::<()>();
        let channels = std::sync::Mutex::new(Some((started_tx, released)));
        let waiting = App::builder()
            .route(
                "/",
                get(handler_fn(move |_req: &RequestContext| {
                    let channels = channels.lock().unwrap().take();
                    async move {
                        if let Some((started, released)) = channels {
                            started.send(()).unwrap();
                            released.await.unwrap();
                        }
                        "old"
                    }
                })),
            )
            .build()
            .unwrap();

        let shared = Arc::new(SharedApp::new(waiting));
        let in_flight = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move { shared.dispatch(request("/")).await }
        });
        started.await.unwrap();

        shared.store(app("new"));
        release.send(()).unwrap();

        assert_eq!(body_text(in_flight.await.unwrap()).await, "old");
        assert_eq!(body_text(shared.dispatch(request("/")).await).await, "new");
    }
}
