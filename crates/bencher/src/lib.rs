/// A route table shaped like a typical REST API, registered for every benchmark.
pub static API_ROUTES: &[RouteDef] = &[
    RouteDef::new("GET", "/"),
    RouteDef::new("GET", "/health"),
    RouteDef::new("GET", "/users"),
    RouteDef::new("POST", "/users"),
    RouteDef::new("GET", "/users/active"),
    RouteDef::new("GET", "/users/:id"),
    RouteDef::new("PUT", "/users/:id"),
    RouteDef::new("DELETE", "/users/:id"),
    RouteDef::new("GET", "/users/:id/repos"),
    RouteDef::new("GET", "/users/:id/repos/:repo"),
    RouteDef::new("GET", "/users/:id/repos/:repo/issues/:number"),
    RouteDef::new("GET", "/orgs/:org/teams/:team/members"),
    RouteDef::new("GET", "/search/code"),
    RouteDef::new("GET", "/search/issues"),
    RouteDef::new("GET", "/assets/*path"),
    RouteDef::new("*", "/hooks/*rest"),
];

#[derive(Debug, Copy, Clone)]
pub struct RouteDef {
    method: &'static str,
    path: &'static str,
}

impl RouteDef {
    pub const fn new(method: &'static str, path: &'static str) -> Self {
        Self { method, path }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// A stable route name derived from the pattern.
    pub fn name(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    method: &'static str,
    path: &'static str,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, method: &'static str, path: &'static str) -> Self {
        Self { name, group, method, path }
    }

    pub fn hit(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self::new(name, TestGroup::Hit, method, path)
    }

    pub fn miss(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self::new(name, TestGroup::Miss, method, path)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    /// The request resolves to a route.
    Hit,
    /// The request ends in a 404 or 405.
    Miss,
}
