//! Resolution of `(host, method, path)` to a registered route.
//!
//! Routes are partitioned by host specificity into three tiers, checked in order:
//!
//! 1. exact hosts (`api.example.com`)
//! 2. suffix wildcards (`*.example.com`), longest domain first
//! 3. host-agnostic routes
//!
//! Every tier owns a segment [trie](trie) in which literal segments take priority
//! over parameters, and parameters over wildcards.

mod trie;

use crate::error::RouteError;
use crate::pattern::{HostPattern, Segment, suffix_matches};
use crate::request::PathParams;
use crate::route::{RouteId, RouteMethod};
use http::Method;
use std::borrow::Cow;
use std::collections::HashMap;
use std::iter;
use trie::{Endpoint, Lookup, Node};

/// Outcome of matching a request against the registered routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched { route: RouteId, params: PathParams },
    /// The path matched but no route accepts the method. `allowed` is sorted ascending.
    MethodMismatch { allowed: Vec<String> },
    NoMatch,
}

#[derive(Debug, Default)]
pub struct Matcher {
    exact: HashMap<String, Node>,
    /// Sorted so that the most specific domain comes first.
    suffix: Vec<(String, Node)>,
    any: Node,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        method: &RouteMethod,
        host: &HostPattern,
        path: &str,
        segments: &[Segment],
        route: RouteId,
    ) -> Result<(), RouteError> {
        let endpoint = Endpoint::new(method.clone(), route, segments);
        self.tier_mut(host).insert(segments, endpoint).map_err(|rejected| RouteError::DuplicateRoute {
            method: rejected.method.to_string(),
            host: match host {
                HostPattern::Any => String::new(),
                host => host.to_string(),
            },
            path: path.to_owned(),
        })
    }

    fn tier_mut(&mut self, host: &HostPattern) -> &mut Node {
        match host {
            HostPattern::Any => &mut self.any,
            HostPattern::Exact(exact) => self.exact.entry(exact.clone()).or_default(),
            HostPattern::SuffixWildcard(domain) => {
                let index = match self.suffix.iter().position(|(existing, _)| existing == domain) {
                    Some(index) => index,
                    None => {
                        let index = self
                            .suffix
                            .iter()
                            .position(|(existing, _)| specificity(existing) < specificity(domain))
                            .unwrap_or(self.suffix.len());
                        self.suffix.insert(index, (domain.clone(), Node::default()));
                        index
                    }
                };
                &mut self.suffix[index].1
            }
        }
    }

    /// Matches a request.
    ///
    /// `host` may still carry a port and upper-case letters, it is normalized
    /// before the host tiers are consulted.
    pub fn at(&self, host: &str, method: &Method, path: &str) -> MatchResult {
        let host = normalize_host(host);
        let segments = path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();

        let tiers = self
            .exact
            .get(host.as_ref())
            .into_iter()
            .chain(self.suffix.iter().filter(|(domain, _)| suffix_matches(domain, &host)).map(|(_, node)| node))
            .chain(iter::once(&self.any));

        let mut mismatch = None;
        for tier in tiers {
            match tier.lookup(method, &segments) {
                Lookup::Found { endpoint, captures } => {
                    let params = endpoint.binders.iter().cloned().zip(captures.into_iter().map(decode)).collect();
                    return MatchResult::Matched { route: endpoint.route, params };
                }
                Lookup::MethodMismatch { allowed } => {
                    mismatch.get_or_insert(allowed);
                }
                Lookup::NotFound => {}
            }
        }

        match mismatch {
            Some(allowed) => MatchResult::MethodMismatch { allowed },
            None => MatchResult::NoMatch,
        }
    }
}

fn specificity(domain: &str) -> (usize, usize) {
    (domain.split('.').count(), domain.len())
}

fn decode(raw: Cow<'_, str>) -> String {
    percent_encoding::percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

/// Strips the port and lower-cases a request host.
///
/// `[::1]:8080` becomes `[::1]`, `Example.COM.` becomes `example.com`.
pub fn normalize_host(host: &str) -> Cow<'_, str> {
    let host = if host.starts_with('[') {
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        host.rsplit_once(':').map_or(host, |(name, _port)| name)
    };
    let host = host.strip_suffix('.').unwrap_or(host);

    if host.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(host.to_ascii_lowercase())
    } else {
        Cow::Borrowed(host)
    }
}
