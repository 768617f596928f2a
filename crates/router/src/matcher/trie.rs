//! Segment trie for a single host tier.
//!
//! Each node may have literal children, one parameter child and one wildcard
//! child. Lookups try them in that order and backtrack when a branch cannot
//! serve the request, so the most specific route wins.

use crate::pattern::Segment;
use crate::route::{RouteId, RouteMethod};
use http::Method;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct Node {
    literals: HashMap<String, Node>,
    param: Option<Box<Node>>,
    wildcard: Option<Box<Node>>,
    endpoints: Vec<Endpoint>,
}

/// A route bound at a terminal node.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub(crate) method: RouteMethod,
    pub(crate) route: RouteId,
    /// Parameter names of the route, in capture order.
    pub(crate) binders: Arc<[String]>,
}

impl Endpoint {
    pub(crate) fn new(method: RouteMethod, route: RouteId, segments: &[Segment]) -> Self {
        let binders = segments.iter().filter_map(Segment::binder).map(ToOwned::to_owned).collect();
        Self { method, route, binders }
    }
}

#[derive(Debug)]
pub(crate) enum Lookup<'t, 'p> {
    Found { endpoint: &'t Endpoint, captures: Vec<Cow<'p, str>> },
    MethodMismatch { allowed: Vec<String> },
    NotFound,
}

struct Search<'t, 'p> {
    method: &'p Method,
    captures: Vec<Cow<'p, str>>,
    /// Whether any terminal node was reached, regardless of method.
    reached: bool,
    /// Explicit methods of every terminal node the path reaches.
    allowed: BTreeSet<&'t str>,
}

impl Node {
    /// Inserts an endpoint at the node addressed by `segments`.
    ///
    /// Returns the rejected endpoint if the node already has a route for the same method.
    pub(crate) fn insert(&mut self, segments: &[Segment], endpoint: Endpoint) -> Result<(), Endpoint> {
        let mut current = self;
        for segment in segments {
            current = match segment {
                Segment::Literal(text) => current.literals.entry(text.clone()).or_default(),
                Segment::Param(_) => current.param.get_or_insert_with(Box::default),
                Segment::Wildcard(_) => current.wildcard.get_or_insert_with(Box::default),
            };
        }

        if current.endpoints.iter().any(|existing| existing.method == endpoint.method) {
            return Err(endpoint);
        }
        current.endpoints.push(endpoint);
        Ok(())
    }

    pub(crate) fn lookup<'t, 'p>(&'t self, method: &'p Method, segments: &[&'p str]) -> Lookup<'t, 'p> {
        let mut search = Search { method, captures: Vec::new(), reached: false, allowed: BTreeSet::new() };

        if let Some(endpoint) = self.walk(segments, &mut search) {
            return Lookup::Found { endpoint, captures: search.captures };
        }

        if search.reached {
            Lookup::MethodMismatch { allowed: search.allowed.into_iter().map(ToOwned::to_owned).collect() }
        } else {
            Lookup::NotFound
        }
    }

    fn walk<'t, 'p>(&'t self, segments: &[&'p str], search: &mut Search<'t, 'p>) -> Option<&'t Endpoint> {
        let Some((&head, rest)) = segments.split_first() else {
            return self.accept(search);
        };

        if let Some(child) = self.literals.get(head)
            && let Some(endpoint) = child.walk(rest, search)
        {
            return Some(endpoint);
        }

        if let Some(child) = &self.param {
            search.captures.push(Cow::Borrowed(head));
            if let Some(endpoint) = child.walk(rest, search) {
                return Some(endpoint);
            }
            search.captures.pop();
        }

        if let Some(child) = &self.wildcard {
            search.captures.push(Cow::Owned(segments.join("/")));
            if let Some(endpoint) = child.accept(search) {
                return Some(endpoint);
            }
            search.captures.pop();
        }

        None
    }

    fn accept<'t>(&'t self, search: &mut Search<'t, '_>) -> Option<&'t Endpoint> {
        if self.endpoints.is_empty() {
            return None;
        }
        search.reached = true;
        search.allowed.extend(self.endpoints.iter().filter_map(|endpoint| match &endpoint.method {
            RouteMethod::Exact(method) => Some(method.as_str()),
            RouteMethod::Any => None,
        }));

        let method = search.method;
        self.endpoints
            .iter()
            .find(|endpoint| matches!(&endpoint.method, RouteMethod::Exact(exact) if exact == method))
            .or_else(|| self.endpoints.iter().find(|endpoint| endpoint.method == RouteMethod::Any))
    }
}
