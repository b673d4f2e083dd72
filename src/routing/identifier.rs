//! Route identifiers.
//!
//! A route is keyed by its HTTP method and its path with the query
//! component removed. Matching is exact: no trailing-slash folding, no
//! case folding on the path.

use std::fmt;

/// Returns the routing path of a request-target: everything before the
/// first `?`, or the whole target when there is none.
pub fn strip_query(target: &str) -> &str {
    match target.split_once('?') {
        Some((path, _)) => path,
        None => target,
    }
}

/// Exact-match key for a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteIdentifier {
    method: String,
    path: String,
}

impl RouteIdentifier {
    /// Create an identifier. Any query component in `path` is dropped.
    pub fn new(method: impl Into<String>, path: impl AsRef<str>) -> Self {
        Self {
            method: method.into(),
            path: strip_query(path.as_ref()).to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_query_takes_left_of_first_question_mark() {
        assert_eq!(strip_query("/items/5?sort=asc"), "/items/5");
        assert_eq!(strip_query("/a?b?c"), "/a");
        assert_eq!(strip_query("/plain"), "/plain");
        assert_eq!(strip_query("?only=query"), "");
    }

    #[test]
    fn identifiers_compare_method_and_path() {
        let a = RouteIdentifier::new("GET", "/items");
        assert_eq!(a, RouteIdentifier::new("GET", "/items"));
        assert_ne!(a, RouteIdentifier::new("POST", "/items"));
        assert_ne!(a, RouteIdentifier::new("GET", "/items/"));
        assert_ne!(a, RouteIdentifier::new("GET", "/Items"));
    }

    #[test]
    fn constructor_drops_query() {
        let id = RouteIdentifier::new("GET", "/search?q=1");
        assert_eq!(id.path(), "/search");
        assert_eq!(id.to_string(), "GET /search");
    }
}
