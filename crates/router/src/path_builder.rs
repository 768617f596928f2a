//! Reverse routing: turning compiled patterns back into concrete URLs.

use crate::pattern::Segment;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use tracing::error;

/// Characters escaped in a substituted path parameter.
const PATH_SEGMENT: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

/// Builds a path from `segments`, substituting parameters by name.
///
/// Returns `None` when a parameter the pattern needs is missing or empty. Parameter values
/// are percent-escaped, wildcard values are emitted as they are (minus a leading `/`)
/// since they usually span several segments.
pub fn build_path<K, V, S>(segments: &[Segment], params: &HashMap<K, V, S>) -> Option<String>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
    S: BuildHasher,
{
    let mut path = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                path.push('/');
                path.push_str(text);
            }
            Segment::Param(name) => {
                let value = params.get(name.as_str())?.as_ref();
                if value.is_empty() {
                    return None;
                }
                path.push('/');
                path.extend(utf8_percent_encode(value, PATH_SEGMENT));
            }
            Segment::Wildcard(name) => {
                let value = params.get(name.as_str())?.as_ref().trim_start_matches('/');
                if value.is_empty() {
                    return None;
                }
                path.push('/');
                path.push_str(value);
            }
        }
    }

    if path.is_empty() {
        path.push('/');
    }
    Some(path)
}

/// Appends `query` to `path`, keys in lexicographic order.
///
/// The output only depends on the contents of `query`, never on its iteration order.
pub fn build_query<K, V, S>(path: &str, query: &HashMap<K, V, S>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if query.is_empty() {
        return path.to_owned();
    }

    let mut pairs = query.iter().map(|(key, value)| (key.as_ref(), value.as_ref())).collect::<Vec<_>>();
    pairs.sort_unstable();

    match serde_urlencoded::to_string(&pairs) {
        Ok(encoded) => {
            let separator = if path.contains('?') { '&' } else { '?' };
            format!("{path}{separator}{encoded}")
        }
        Err(e) => {
            error!(path, cause = %e, "failed to encode query string");
            path.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile_path;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn missing_param_is_a_soft_failure() {
        let segments = compile_path("/users/:id").unwrap();
        assert_eq!(build_path(&segments, &params(&[])), None);
    }

    #[test]
    fn params_are_escaped() {
        let segments = compile_path("/users/:id").unwrap();
        assert_eq!(build_path(&segments, &params(&[("id", "42")])).as_deref(), Some("/users/42"));
        assert_eq!(build_path(&segments, &params(&[("id", "4 2")])).as_deref(), Some("/users/4%202"));
        assert_eq!(build_path(&segments, &params(&[("id", "a/b?")])).as_deref(), Some("/users/a%2Fb%3F"));
    }

    #[test]
    fn wildcard_is_verbatim() {
        let segments = compile_path("/assets/*path").unwrap();
        assert_eq!(build_path(&segments, &params(&[("path", "/css/app.css")])).as_deref(), Some("/assets/css/app.css"));
        assert_eq!(build_path(&segments, &params(&[])), None);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let user = compile_path("/users/:id").unwrap();
        assert_eq!(build_path(&user, &params(&[("id", "")])), None);

        let assets = compile_path("/assets/*path").unwrap();
        assert_eq!(build_path(&assets, &params(&[("path", "")])), None);
        assert_eq!(build_path(&assets, &params(&[("path", "/")])), None);
    }

    #[test]
    fn root_path() {
        assert_eq!(build_path(&compile_path("/").unwrap(), &params(&[])).as_deref(), Some("/"));
    }

    #[test]
    fn extra_params_are_ignored() {
        let segments = compile_path("/users/:id").unwrap();
        let map = HashMap::from([("id", "7"), ("unused", "x")]);
        assert_eq!(build_path(&segments, &map).as_deref(), Some("/users/7"));
    }

    #[test]
    fn query_is_sorted() {
        let query = params(&[("b", "2"), ("a", "1")]);
        for _ in 0..8 {
            assert_eq!(build_query("/users/42", &query), "/users/42?a=1&b=2");
        }
    }

    #[test]
    fn query_is_encoded_and_appended() {
        let query = params(&[("q", "rust lang"), ("page", "2")]);
        assert_eq!(build_query("/search?x=1", &query), "/search?x=1&page=2&q=rust+lang");
        assert_eq!(build_query("/search", &params(&[])), "/search");
    }
}
