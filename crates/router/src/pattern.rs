//! Route pattern compilation.
//!
//! Path patterns are `/`-separated and may contain named parameters (`:id`) and a
//! trailing wildcard (`*path`):
//!
//! ```
//! use micro_router::pattern::{compile_path, Segment};
//!
//! let segments = compile_path("/users/:id/files/*path").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("users".into()),
//!     Segment::Param("id".into()),
//!     Segment::Literal("files".into()),
//!     Segment::Wildcard("path".into()),
//! ]);
//! ```
//!
//! Host patterns are `.`-separated labels, where a single leading `*` label makes
//! the pattern match any subdomain of the remaining labels.

use crate::error::PatternError;
use std::collections::HashSet;
use std::fmt;

/// One compiled component of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    /// Binds the rest of the request path, always the last segment.
    Wildcard(String),
}

impl Segment {
    /// The parameter name bound by this segment, if any.
    pub fn binder(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param(name) | Segment::Wildcard(name) => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Param(name) => write!(f, ":{name}"),
            Segment::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// Compiles a path pattern into its segments.
///
/// Empty segments are dropped, so `/`, `""` and `//` all compile to the empty
/// list which only matches the root path.
pub fn compile_path(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    let raw_segments = pattern.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut binders = HashSet::new();

    for (index, raw) in raw_segments.iter().enumerate() {
        let segment = if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name.to_owned())
        } else if let Some(name) = raw.strip_prefix('*') {
            if index + 1 != raw_segments.len() {
                return Err(PatternError::invalid_wildcard_position(pattern));
            }
            Segment::Wildcard(name.to_owned())
        } else {
            Segment::Literal((*raw).to_owned())
        };

        if let Some(name) = segment.binder() {
            if name.is_empty() {
                return Err(PatternError::empty_param_name(pattern));
            }
            if !binders.insert(name.to_owned()) {
                return Err(PatternError::duplicate_param_name(pattern, name));
            }
        }

        segments.push(segment);
    }

    Ok(segments)
}

/// A compiled host pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum HostPattern {
    /// Matches every host.
    #[default]
    Any,
    Exact(String),
    /// `*.example.com` is stored as `SuffixWildcard("example.com")`.
    SuffixWildcard(String),
}

impl HostPattern {
    /// Checks a normalized (lowercase, port-free) request host against this pattern.
    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostPattern::Any => true,
            HostPattern::Exact(exact) => exact.eq_ignore_ascii_case(host),
            HostPattern::SuffixWildcard(domain) => suffix_matches(domain, host),
        }
    }
}

pub(crate) fn suffix_matches(domain: &str, host: &str) -> bool {
    let (host, domain) = (host.as_bytes(), domain.as_bytes());
    host.len() > domain.len() + 1
        && host[host.len() - domain.len() - 1] == b'.'
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPattern::Any => f.write_str("*"),
            HostPattern::Exact(host) => f.write_str(host),
            HostPattern::SuffixWildcard(domain) => write!(f, "*.{domain}"),
        }
    }
}

/// Compiles a host pattern.
///
/// The empty string compiles to [`HostPattern::Any`].
pub fn compile_host(pattern: &str) -> Result<HostPattern, PatternError> {
    if pattern.is_empty() {
        return Ok(HostPattern::Any);
    }

    let labels = pattern.split('.').collect::<Vec<_>>();
    if labels.iter().any(|label| label.is_empty()) {
        return Err(PatternError::invalid_host(pattern, "empty label"));
    }

    if labels.iter().skip(1).any(|label| label.contains('*')) || (labels[0].contains('*') && labels[0] != "*") {
        return Err(PatternError::invalid_wildcard_position(pattern));
    }

    if labels[0] == "*" {
        if labels.len() == 1 {
            return Err(PatternError::invalid_host(pattern, "wildcard without a domain"));
        }
        return Ok(HostPattern::SuffixWildcard(labels[1..].join(".").to_ascii_lowercase()));
    }

    Ok(HostPattern::Exact(pattern.to_ascii_lowercase()))
}
