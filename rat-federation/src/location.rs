//! Locations and navigation events shared by host and remote routers.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Where the user is: a pathname plus an optional `?query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    /// Build a location from its parts, normalising both.
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: normalize_pathname(&pathname.into()),
            search: normalize_search(&search.into()),
        }
    }

    /// Parse an href such as `/workshops/5?page=2#top`. The fragment is dropped.
    pub fn parse(href: &str) -> Self {
        let href = href.split('#').next().unwrap_or_default();
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, format!("?{query}")),
            None => Self::new(href, ""),
        }
    }

    /// Render back into an href.
    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }

    /// Look up a single query parameter, percent-decoded.
    pub fn query(&self, key: &str) -> Option<Cow<'_, str>> {
        self.search
            .trim_start_matches('?')
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| urlencoding::decode(v).unwrap_or(Cow::Borrowed(v)))
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/", "")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

impl FromStr for Location {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Self::parse(href)
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Self::parse(&href)
    }
}

impl From<&Location> for Location {
    fn from(location: &Location) -> Self {
        location.clone()
    }
}

fn normalize_pathname(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn normalize_search(search: &str) -> String {
    let query = search.trim().trim_start_matches('?');
    if query.is_empty() {
        String::new()
    } else {
        format!("?{query}")
    }
}

/// Which side of the host/remote boundary started a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Host,
    Remote,
}

/// Emitted by a router whenever its location changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Pathname before the change.
    pub pathname: String,
    pub next_pathname: String,
    pub search: String,
    pub origin: Origin,
}

impl NavigationEvent {
    pub fn new(from: &Location, to: &Location, origin: Origin) -> Self {
        Self {
            pathname: from.pathname.clone(),
            next_pathname: to.pathname.clone(),
            search: to.search.clone(),
            origin,
        }
    }

    /// The location this event navigated to.
    pub fn next_location(&self) -> Location {
        Location::new(self.next_pathname.clone(), self.search.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_href() {
        let loc = Location::parse("/workshops/5?page=2#details");
        assert_eq!(loc.pathname, "/workshops/5");
        assert_eq!(loc.search, "?page=2");
        assert_eq!(loc.href(), "/workshops/5?page=2");
    }

    #[test]
    fn test_normalization() {
        assert_eq!(Location::parse(""), Location::new("/", ""));
        assert_eq!(Location::parse("favorites?"), Location::new("/favorites", ""));
        assert_eq!(Location::new("/a", "b=1").search, "?b=1");
    }

    #[test]
    fn test_query_lookup() {
        let loc = Location::parse("/workshops?_page=3&category=frontend&flag");
        assert_eq!(loc.query("_page").as_deref(), Some("3"));
        assert_eq!(loc.query("category").as_deref(), Some("frontend"));
        assert_eq!(loc.query("flag").as_deref(), Some(""));
        assert_eq!(loc.query("missing"), None);

        let encoded = Location::parse("/workshops?category=R%26D%3Dfun%20stuff");
        assert_eq!(encoded.query("category").as_deref(), Some("R&D=fun stuff"));
    }

    #[test]
    fn test_event_next_location() {
        let from = Location::parse("/workshops");
        let to = Location::parse("/workshops/5?page=2");
        let event = NavigationEvent::new(&from, &to, Origin::Remote);
        assert_eq!(event.pathname, "/workshops");
        assert_eq!(event.next_pathname, "/workshops/5");
        assert_eq!(event.search, "?page=2");
        assert_eq!(event.next_location(), to);
    }
}
