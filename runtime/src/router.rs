//! Location state with the Store's subscribe contract
//!
//! The router keeps the current path, the route it matched and the decoded
//! query string, and notifies subscribers whenever any of them changes.
//! Route patterns are matched segment by segment: a `:name` segment captures
//! one percent-decoded path segment, every other segment must match
//! literally. Trailing slashes are ignored.

use crate::binding::ExternalStore;
use crate::subscription::{Listeners, Subscription};
use std::collections::BTreeMap;
use percent_encoding::percent_decode_str;
use std::sync::{Arc, PoisonError, RwLock};
use url::form_urlencoded;

/// Decoded query string, ordered by key
pub type Query = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route<P> {
    pattern: Arc<str>,
    segments: Vec<Segment>,
    page: P,
}

/// A route that matched the current path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<P> {
    /// Pattern the route was registered with
    pub pattern: Arc<str>,
    /// Page value registered for the route
    pub page: P,
    /// Captured `:name` segments
    pub params: BTreeMap<String, String>,
}

/// Snapshot of the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterState<P> {
    /// Path without the base prefix, query or fragment
    pub path: String,
    /// Matched route, `None` when no pattern matches
    pub route: Option<RouteMatch<P>>,
    /// Decoded query parameters
    pub query: Query,
}

impl<P> RouterState<P> {
    /// Captured parameter of the matched route
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route
            .as_ref()
            .and_then(|route| route.params.get(name))
            .map(String::as_str)
    }

    /// Query parameter by name
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Route table plus live location state
///
/// # Example
///
/// ```
/// use storefront_runtime::router::Router;
///
/// let router = Router::new("/")
///     .route("/", "home")
///     .route("/product/:id/", "detail");
///
/// router.navigate("/product/85/?tab=reviews");
///
/// let state = router.state();
/// assert_eq!(state.param("id"), Some("85"));
/// assert_eq!(state.query_value("tab"), Some("reviews"));
/// ```
pub struct Router<P> {
    base: String,
    routes: Vec<Route<P>>,
    state: RwLock<Arc<RouterState<P>>>,
    listeners: Arc<Listeners>,
}

impl<P: Clone + PartialEq> Router<P> {
    /// Create a router serving under `base` (e.g. `/` or `/shop/`)
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            routes: Vec::new(),
            state: RwLock::new(Arc::new(RouterState {
                path: "/".to_string(),
                route: None,
                query: Query::new(),
            })),
            listeners: Listeners::new(),
        }
    }

    /// Register a route; earlier registrations win
    #[must_use]
    pub fn route(mut self, pattern: &str, page: P) -> Self {
        self.add_route(pattern, page);
        self
    }

    /// Register a route in place
    pub fn add_route(&mut self, pattern: &str, page: P) {
        self.routes.push(Route {
            pattern: Arc::from(pattern),
            segments: parse_pattern(pattern),
            page,
        });
    }

    /// Find the route for a path (base already stripped)
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<P>> {
        let segments = split_path(path);

        self.routes.iter().find_map(|route| {
            if route.segments.len() != segments.len() {
                return None;
            }

            let mut params = BTreeMap::new();
            for (expected, actual) in route.segments.iter().zip(&segments) {
                match expected {
                    Segment::Literal(literal) if literal == actual => {}
                    Segment::Literal(_) => return None,
                    Segment::Param(name) => {
                        let value = percent_decode_str(actual).decode_utf8_lossy();
                        params.insert(name.clone(), value.into_owned());
                    }
                }
            }

            Some(RouteMatch {
                pattern: Arc::clone(&route.pattern),
                page: route.page.clone(),
                params,
            })
        })
    }

    /// Strip the base prefix from a request path
    #[must_use]
    pub fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// Move to `href` (path with optional query and fragment)
    ///
    /// Subscribers are notified when the resulting state differs from the
    /// current one.
    #[tracing::instrument(skip(self), name = "router_navigate")]
    pub fn navigate(&self, href: &str) {
        let without_fragment = href.split('#').next().unwrap_or_default();
        let (raw_path, raw_query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        let path = match self.strip_base(raw_path) {
            "" => "/".to_string(),
            stripped => stripped.to_string(),
        };
        let query: Query = form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let route = self.match_path(&path);

        tracing::debug!(%path, matched = route.is_some(), "Navigated");
        self.commit(RouterState { path, route, query });
    }

    /// Merge `updates` into the query; an empty value removes the key
    pub fn set_query<I, K, V>(&self, updates: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let current = self.state();
        let mut query = current.query.clone();

        for (key, value) in updates {
            let (key, value): (String, String) = (key.into(), value.into());
            if value.is_empty() {
                query.remove(&key);
            } else {
                query.insert(key, value);
            }
        }

        self.commit(RouterState {
            path: current.path.clone(),
            route: current.route.clone(),
            query,
        });
    }

    /// Current path plus encoded query, without the base prefix
    #[must_use]
    pub fn href(&self) -> String {
        let state = self.state();
        if state.query.is_empty() {
            return state.path.clone();
        }

        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(state.query.iter())
            .finish();
        format!("{}?{encoded}", state.path)
    }

    /// Current snapshot
    #[must_use]
    pub fn state(&self) -> Arc<RouterState<P>> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current query
    #[must_use]
    pub fn query(&self) -> Query {
        self.state().query.clone()
    }

    /// Register a listener called after every location change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    fn commit(&self, next: RouterState<P>) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if **state == next {
                return;
            }
            *state = Arc::new(next);
        }
        self.listeners.notify();
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(segment.to_string()),
        })
        .collect()
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

impl<P: Clone + PartialEq> ExternalStore for Router<P> {
    type State = RouterState<P>;

    fn snapshot(&self) -> Arc<Self::State> {
        self.state()
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }
}

impl<P: std::fmt::Debug + Clone + PartialEq> std::fmt::Debug for Router<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.base)
            .field("routes", &self.routes.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Page {
        Home,
        Detail,
    }

    fn router() -> Router<Page> {
        Router::new("/")
            .route("/", Page::Home)
            .route("/product/:id/", Page::Detail)
    }

    #[test]
    fn test_root_matches_home() {
        let router = router();
        router.navigate("/");

        assert_eq!(router.state().route.as_ref().unwrap().page, Page::Home);
    }

    #[test]
    fn test_param_is_captured_with_or_without_trailing_slash() {
        let router = router();

        router.navigate("/product/85/");
        assert_eq!(router.state().param("id"), Some("85"));

        router.navigate("/product/86");
        assert_eq!(router.state().param("id"), Some("86"));
    }

    #[test]
    fn test_param_is_percent_decoded() {
        let router = router();

        router.navigate("/product/a%20b/");
        assert_eq!(router.state().param("id"), Some("a b"));

        router.navigate("/product/%EC%BC%80%EC%9D%B4%EB%B8%94/");
        assert_eq!(router.state().param("id"), Some("케이블"));
    }

    #[test]
    fn test_unknown_path_has_no_route() {
        let router = router();
        router.navigate("/cart/checkout");

        assert!(router.state().route.is_none());
        assert_eq!(router.state().path, "/cart/checkout");
    }

    #[test]
    fn test_base_is_stripped() {
        let router = Router::new("/shop/").route("/product/:id/", Page::Detail);

        router.navigate("/shop/product/7/");

        assert_eq!(router.state().path, "/product/7/");
        assert_eq!(router.state().param("id"), Some("7"));
        assert_eq!(router.strip_base("/shop"), "/");
        assert_eq!(router.strip_base("/shopping"), "/shopping");
    }

    #[test]
    fn test_query_is_decoded_and_empty_values_dropped() {
        let router = router();
        router.navigate("/?search=%EC%85%94%EC%B8%A0&category1=&current=2#top");

        let state = router.state();
        assert_eq!(state.query_value("search"), Some("셔츠"));
        assert_eq!(state.query_value("current"), Some("2"));
        assert!(state.query_value("category1").is_none());
    }

    #[test]
    fn test_set_query_merges_and_removes() {
        let router = router();
        router.navigate("/?search=shoe&sort=price_asc");

        router.set_query([("search", ""), ("current", "1")]);

        let query = router.query();
        assert!(!query.contains_key("search"));
        assert_eq!(query.get("sort").map(String::as_str), Some("price_asc"));
        assert_eq!(query.get("current").map(String::as_str), Some("1"));
        assert_eq!(router.href(), "/?current=1&sort=price_asc");
    }

    #[test]
    fn test_subscribers_fire_only_on_change() {
        let router = router();
        let calls = Arc::new(AtomicUsize::new(0));
        let _subscription = router.subscribe({
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        });

        router.navigate("/product/1/");
        router.navigate("/product/1/");
        router.set_query([("limit", "20")]);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
