use bencher::{TestCase, API_ROUTES};
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use http::{Method, Request};
use micro_router::app::method;
use micro_router::{handler_fn, App, RequestContext, RouteOptions, RouteTable};
use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Arc;

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::hit("root", "GET", "/"),
        TestCase::hit("literal", "GET", "/users/active"),
        TestCase::hit("param", "GET", "/users/42"),
        TestCase::hit("deep_params", "GET", "/users/42/repos/router/issues/7"),
        TestCase::hit("wildcard", "GET", "/assets/css/app/main.css"),
        TestCase::hit("any_method", "PATCH", "/hooks/github/push"),
        TestCase::miss("not_found", "GET", "/nothing/here"),
        TestCase::miss("method_not_allowed", "PATCH", "/users/42"),
    ]
}

fn route_table() -> RouteTable {
    let mut table = RouteTable::new();
    for route in API_ROUTES {
        let handler = Arc::new(handler_fn(|_req: &RequestContext| async { "ok" }));
        let options = RouteOptions { name: Some(route.name()), ..RouteOptions::default() };
        table.add(route.method(), route.path(), handler, options).expect("bench routes should be valid");
    }
    table
}

fn app() -> App {
    API_ROUTES
        .iter()
        .fold(App::builder(), |builder, route| {
            builder.route(
                route.path(),
                method(route.method(), handler_fn(|_req: &RequestContext| async { "ok" })).name(route.name()),
            )
        })
        .build()
        .expect("bench routes should be valid")
}

fn benchmark_matcher(criterion: &mut Criterion) {
    let table = route_table();
    let mut group = criterion.benchmark_group("matcher");

    for case in create_test_cases() {
        let method = Method::from_bytes(case.method().as_bytes()).expect("bench methods should be valid");
        group.bench_with_input(BenchmarkId::new(format!("{:?}", case.group()), case.name()), &case, |b, case| {
            b.iter(|| black_box(table.matches("example.com", &method, black_box(case.path()))));
        });
    }

    group.finish();
}

fn benchmark_dispatch(criterion: &mut Criterion) {
    let app = app();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime should start");
    let mut group = criterion.benchmark_group("dispatch");

    for case in create_test_cases() {
        group.bench_with_input(BenchmarkId::new(format!("{:?}", case.group()), case.name()), &case, |b, case| {
            b.iter(|| {
                let request = Request::builder()
                    .method(case.method())
                    .uri(case.path())
                    .body(Bytes::new())
                    .expect("bench requests should be valid");
                black_box(runtime.block_on(app.dispatch(request)))
            });
        });
    }

    group.finish();
}

fn benchmark_path_builder(criterion: &mut Criterion) {
    let app = app();
    let params = HashMap::from([("id", "42"), ("repo", "micro router"), ("number", "7")]);
    let query = HashMap::from([("state", "open"), ("page", "2"), ("sort", "created")]);
    let mut group = criterion.benchmark_group("path_builder");

    group.bench_function("path", |b| {
        b.iter(|| black_box(app.path("GET /users/:id/repos/:repo/issues/:number", black_box(&params))));
    });
    group.bench_function("path_with_query", |b| {
        b.iter(|| {
            black_box(app.path_with_query("GET /users/:id/repos/:repo/issues/:number", black_box(&params), &query))
        });
    });

    group.finish();
}

criterion_group!(matcher, benchmark_matcher, benchmark_dispatch, benchmark_path_builder);
criterion_main!(matcher);
