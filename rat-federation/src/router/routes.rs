//! Path-pattern route tables.
//!
//! Patterns are made of static segments (`workshops`), named parameters (`:id`)
//! and an optional trailing wildcard (`*`). The first matching pattern wins.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    Wildcard,
}

/// A parsed path pattern such as `/workshops/:id/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|seg| match seg {
                "*" => Segment::Wildcard,
                s if s.len() > 1 && s.starts_with(':') => Segment::Param(s[1..].to_string()),
                s => Segment::Static(s.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a pathname, returning the captured parameters.
    pub fn matches(&self, pathname: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = split_path(pathname).collect();
        let mut params = BTreeMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    params.insert("*".to_string(), parts.get(i..).unwrap_or_default().join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// The result of resolving a pathname against a `RouteTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<R> {
    pub route: R,
    pub pattern: String,
    pub params: BTreeMap<String, String>,
}

impl<R> RouteMatch<R> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered list of `(pattern, route)` pairs.
#[derive(Debug, Clone)]
pub struct RouteTable<R> {
    routes: Vec<(RoutePattern, R)>,
}

impl<R: Clone> RouteTable<R> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. Earlier routes take precedence.
    pub fn route(mut self, pattern: &str, route: R) -> Self {
        self.routes.push((RoutePattern::parse(pattern), route));
        self
    }

    pub fn resolve(&self, pathname: &str) -> Option<RouteMatch<R>> {
        self.routes.iter().find_map(|(pattern, route)| {
            pattern.matches(pathname).map(|params| RouteMatch {
                route: route.clone(),
                pattern: pattern.as_str().to_string(),
                params,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<R: Clone> Default for RouteTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a `RouteTable` from `"pattern" => route` pairs.
///
/// # Example
/// ```ignore
/// use rat_federation::route_table;
///
/// let routes = route_table! {
///     "/workshops" => Page::List,
///     "/workshops/:id" => Page::Details,
/// };
/// assert_eq!(routes.resolve("/workshops/5").unwrap().param("id"), Some("5"));
/// ```
#[macro_export]
macro_rules! route_table {
    ($($pattern:literal => $route:expr),* $(,)?) => {
        $crate::router::RouteTable::new()
            $(.route($pattern, $route))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Page {
        Home,
        List,
        Details,
        Add,
        Any,
    }

    fn table() -> RouteTable<Page> {
        route_table! {
            "/" => Page::Home,
            "/workshops" => Page::List,
            "/workshops/:id" => Page::Details,
            "/workshops/:id/add" => Page::Add,
        }
    }

    #[test]
    fn test_resolve_static_and_params() {
        let routes = table();
        assert_eq!(routes.resolve("/").map(|m| m.route), Some(Page::Home));
        assert_eq!(routes.resolve("/workshops/").map(|m| m.route), Some(Page::List));

        let details = routes.resolve("/workshops/5").unwrap();
        assert_eq!(details.route, Page::Details);
        assert_eq!(details.param("id"), Some("5"));
        assert_eq!(details.pattern, "/workshops/:id");

        let add = routes.resolve("/workshops/12/add").unwrap();
        assert_eq!(add.route, Page::Add);
        assert_eq!(add.param("id"), Some("12"));
    }

    #[test]
    fn test_not_found() {
        let routes = table();
        assert!(routes.resolve("/favorites").is_none());
        assert!(routes.resolve("/workshops/5/sessions/9").is_none());
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let routes = RouteTable::new().route("/workshops/*", Page::Any);
        let m = routes.resolve("/workshops/5/add").unwrap();
        assert_eq!(m.param("*"), Some("5/add"));
        assert_eq!(routes.resolve("/workshops").unwrap().param("*"), Some(""));
        assert!(routes.resolve("/favorites").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let routes = RouteTable::new()
            .route("/workshops/*", Page::Any)
            .route("/workshops/:id", Page::Details);
        assert_eq!(routes.resolve("/workshops/1").unwrap().route, Page::Any);
    }
}
