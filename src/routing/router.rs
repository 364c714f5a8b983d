//! Route registration and request dispatch.
//!
//! # Responsibilities
//! - Own one radix tree per HTTP method
//! - Validate and register routes, logging each registration
//! - Resolve a request to handlers, a redirect, 405, or 404
//!
//! # Design Decisions
//! - Built once, then read concurrently; reconfiguration replaces the whole
//!   router (see `shared.rs`)
//! - The registration log hook is injected, there is no global debug mode
//! - Explicit `NotFound` rather than a silent default

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::routing::error::RouteError;
use crate::routing::node::{HandlersChain, Node};
use crate::routing::params::Params;
use crate::routing::path::{clean_path, toggle_trailing_slash};
use crate::routing::tree::MethodTrees;

/// Dispatch behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Redirect `/foo/` to `/foo` (or the reverse) when only the other exists.
    pub redirect_trailing_slash: bool,

    /// Clean the path and retry case-insensitively, redirecting on success.
    pub redirect_fixed_path: bool,

    /// Answer 405 instead of 404 when another method matches the path.
    pub handle_method_not_allowed: bool,

    /// Percent-decode parameter values.
    ///
    /// Decoding happens once, during lookup, so the path handed to
    /// [`Router::dispatch`] must be the raw request path. A path the engine
    /// already decoded would be decoded twice (`%2520` would yield a space).
    pub unescape_path_values: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: false,
            handle_method_not_allowed: false,
            unescape_path_values: true,
        }
    }
}

/// Receives `(method, path, chain length)` for every registration.
pub type RouteLogger = Arc<dyn Fn(&str, &str, usize) + Send + Sync>;

fn default_route_logger() -> RouteLogger {
    Arc::new(|method, path, handlers| {
        tracing::debug!(method = %method, path = %path, handlers, "Route registered");
    })
}

/// A registered route, as listed by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    pub handlers: usize,
}

/// Outcome of [`Router::dispatch`].
#[derive(Debug)]
pub enum Dispatch<'k, 'v, H> {
    Found {
        handlers: &'k HandlersChain<H>,
        params: Params<'k, 'v>,
    },
    Redirect {
        location: String,
        status: u16,
    },
    MethodNotAllowed {
        allowed: Vec<String>,
    },
    NotFound,
}

impl<'k, 'v, H> Dispatch<'k, 'v, H> {
    /// The parameter buffer, for recycling into the next request. Outcomes
    /// other than `Found` give back an empty buffer.
    pub fn into_params(self) -> Params<'k, 'v> {
        match self {
            Dispatch::Found { params, .. } => params,
            _ => Params::new(),
        }
    }

    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Dispatch::Found { .. } => "found",
            Dispatch::Redirect { .. } => "redirect",
            Dispatch::MethodNotAllowed { .. } => "method_not_allowed",
            Dispatch::NotFound => "not_found",
        }
    }
}

/// HTTP router over per-method radix trees.
pub struct Router<H> {
    trees: MethodTrees<H>,
    config: RouterConfig,
    route_logger: RouteLogger,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<H: fmt::Debug> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("trees", &self.trees)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<H> Router<H> {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            trees: MethodTrees::new(),
            config,
            route_logger: default_route_logger(),
        }
    }

    /// Replaces the registration log hook.
    pub fn with_route_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str, &str, usize) + Send + Sync + 'static,
    {
        self.route_logger = Arc::new(logger);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registers `handlers` for `method` and the pattern `path`.
    ///
    /// On error neither the method table nor any tree is modified.
    pub fn add_route(
        &mut self,
        method: &str,
        path: &str,
        handlers: impl Into<HandlersChain<H>>,
    ) -> Result<(), RouteError> {
        let handlers = handlers.into();
        if !path.starts_with('/') {
            return Err(RouteError::InvalidPath(path.to_string()));
        }
        if method.is_empty() {
            return Err(RouteError::EmptyMethod);
        }
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlers(path.to_string()));
        }

        (self.route_logger)(method, path, handlers.len());

        match self.trees.get_mut(method) {
            Some(root) => root.add_route(path, handlers),
            None => {
                let mut root = Node::new();
                root.add_route(path, handlers)?;
                self.trees.append(method, root);
                Ok(())
            }
        }
    }

    /// Chain registered under exactly this method and pattern.
    pub fn get_handlers(&self, method: &str, path: &str) -> Option<&HandlersChain<H>> {
        if method.is_empty() || !path.starts_with('/') {
            return None;
        }
        self.trees.get(method)?.get_handlers(path)
    }

    /// Removes the route if it is still bound to `handlers`.
    pub fn del_route(&mut self, method: &str, path: &str, handlers: &HandlersChain<H>) -> bool {
        if method.is_empty() || !path.starts_with('/') || handlers.is_empty() {
            return false;
        }
        match self.trees.get_mut(method) {
            Some(root) => root.del_route(path, handlers),
            None => false,
        }
    }

    /// Plain tree lookup, without redirects or method fallback.
    ///
    /// `path` is the raw request path; see
    /// [`RouterConfig::unescape_path_values`].
    pub fn lookup<'k, 'v>(
        &'k self,
        method: &str,
        path: &'v str,
        unescape: bool,
    ) -> Option<(&'k HandlersChain<H>, Params<'k, 'v>)> {
        let value = self.trees.get(method)?.get_value(path, Params::new(), unescape);
        value.handlers.map(|handlers| (handlers, value.params))
    }

    /// Resolves a request the way a serving engine answers it.
    ///
    /// `path` must be the raw, still percent-encoded request path.
    pub fn dispatch<'k, 'v>(&'k self, method: &str, path: &'v str) -> Dispatch<'k, 'v, H> {
        self.dispatch_with(method, path, Params::new())
    }

    /// Like [`Router::dispatch`], filling a pooled parameter buffer.
    ///
    /// The buffer may come from an earlier request on another path; it is
    /// recycled before use. Get it back with [`Dispatch::into_params`].
    pub fn dispatch_with<'k, 'v>(
        &'k self,
        method: &str,
        path: &'v str,
        params: Params<'_, '_>,
    ) -> Dispatch<'k, 'v, H> {
        let dispatch = self.resolve(method, path, params.recycle());
        metrics::record_dispatch(self.method_label(method), dispatch.outcome());
        dispatch
    }

    /// Methods without a tree share one label, so request-supplied method
    /// tokens cannot grow the metric series.
    fn method_label<'m>(&self, method: &'m str) -> &'m str {
        if self.trees.get(method).is_some() {
            method
        } else {
            metrics::OTHER_METHOD
        }
    }

    fn resolve<'k, 'v>(&'k self, method: &str, path: &'v str, params: Params<'k, 'v>) -> Dispatch<'k, 'v, H> {
        let unescape = self.config.unescape_path_values;

        if let Some(root) = self.trees.get(method) {
            let value = root.get_value(path, params, unescape);
            if let Some(handlers) = value.handlers {
                return Dispatch::Found {
                    handlers,
                    params: value.params,
                };
            }

            if method != "CONNECT" && path != "/" {
                let status = if method == "GET" { 301 } else { 307 };

                if value.tsr && self.config.redirect_trailing_slash {
                    let location = toggle_trailing_slash(path);
                    tracing::debug!(status, from = %path, to = %location, "Redirecting trailing slash");
                    return Dispatch::Redirect { location, status };
                }

                if self.config.redirect_fixed_path {
                    if let Some(location) = root.find_case_insensitive_path(&clean_path(path), true) {
                        tracing::debug!(status, from = %path, to = %location, "Redirecting to fixed path");
                        return Dispatch::Redirect { location, status };
                    }
                }
            }
        }

        if self.config.handle_method_not_allowed {
            let allowed: Vec<String> = self
                .trees
                .iter()
                .filter(|tree| tree.method != method)
                .filter(|tree| tree.root.get_value(path, Params::new(), false).handlers.is_some())
                .map(|tree| tree.method.clone())
                .collect();
            if !allowed.is_empty() {
                return Dispatch::MethodNotAllowed { allowed };
            }
        }

        Dispatch::NotFound
    }

    /// Every registered route, per method tree in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.trees
            .iter()
            .flat_map(|tree| {
                tree.root.routes().into_iter().map(|(path, handlers)| RouteInfo {
                    method: tree.method.clone(),
                    path,
                    handlers: handlers.len(),
                })
            })
            .collect()
    }

    /// Largest parameter count of any route, for sizing pooled buffers.
    pub fn max_params(&self) -> usize {
        self.trees
            .iter()
            .map(|tree| tree.root.max_params())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn router(config: RouterConfig, routes: &[(&str, &'static str)]) -> Router<&'static str> {
        let mut router = Router::new(config);
        for &(method, path) in routes {
            router
                .add_route(method, path, vec![path])
                .unwrap_or_else(|e| panic!("{method} {path}: {e}"));
        }
        router
    }

    fn redirect<H>(dispatch: Dispatch<'_, '_, H>) -> Option<(String, u16)> {
        match dispatch {
            Dispatch::Redirect { location, status } => Some((location, status)),
            _ => None,
        }
    }

    #[test]
    fn test_add_route_validation() {
        let mut router: Router<&str> = Router::default();
        assert_eq!(router.add_route("GET", "nope", vec!["h"]), Err(RouteError::InvalidPath("nope".into())));
        assert_eq!(router.add_route("", "/a", vec!["h"]), Err(RouteError::EmptyMethod));
        assert_eq!(
            router.add_route("GET", "/a", Vec::<&str>::new()),
            Err(RouteError::EmptyHandlers("/a".into()))
        );
        // nothing was registered, not even an empty tree
        assert!(router.routes().is_empty());
        assert_eq!(router.trees.len(), 0);

        assert!(router.add_route("GET", "/a/:x:y", vec!["h"]).is_err());
        assert_eq!(router.trees.len(), 0);
    }

    #[test]
    fn test_dispatch_found() {
        let router = router(RouterConfig::default(), &[("GET", "/user/:name"), ("GET", "/files/*path")]);

        match router.dispatch("GET", "/user/gopher%20x") {
            Dispatch::Found { handlers, params } => {
                assert_eq!(handlers.last(), Some(&"/user/:name"));
                assert_eq!(params.get("name"), Some("gopher x"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match router.dispatch("GET", "/files/a/b.txt") {
            Dispatch::Found { params, .. } => assert_eq!(params.get("path"), Some("a/b.txt")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_values_decoded_once() {
        let router = router(RouterConfig::default(), &[("GET", "/user/:name")]);
        match router.dispatch("GET", "/user/a%2520b") {
            Dispatch::Found { params, .. } => assert_eq!(params.get("name"), Some("a%20b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_with_pooled_buffer() {
        let router = router(RouterConfig::default(), &[("GET", "/user/:id"), ("GET", "/team/:team/:id")]);
        let mut buffer = Params::with_capacity(router.max_params());

        for i in 0..50 {
            let path = if i % 2 == 0 { format!("/user/{i}") } else { format!("/team/t{i}/{i}") };
            let dispatch = router.dispatch_with("GET", &path, buffer);
            let params = match dispatch {
                Dispatch::Found { params, .. } => params,
                other => panic!("unexpected {other:?}"),
            };
            assert_eq!(params.get("id"), Some(i.to_string().as_str()));
            buffer = params.recycle();
        }

        let missed = router.dispatch_with("GET", "/nowhere", buffer);
        assert!(matches!(missed, Dispatch::NotFound));
        assert!(missed.into_params().is_empty());
    }

    #[test]
    fn test_unknown_methods_share_metric_label() {
        use ::metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
        use std::collections::HashSet;

        #[derive(Default)]
        struct SeriesRecorder {
            series: Mutex<HashSet<String>>,
        }

        impl Recorder for SeriesRecorder {
            fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

            fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
                let labels: Vec<String> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
                self.series
                    .lock()
                    .expect("lock")
                    .insert(format!("{}{{{}}}", key.name(), labels.join(",")));
                Counter::noop()
            }

            fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
                Gauge::noop()
            }

            fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
                Histogram::noop()
            }
        }

        let router = router(RouterConfig::default(), &[("GET", "/"), ("POST", "/")]);
        let recorder = SeriesRecorder::default();
        ::metrics::with_local_recorder(&recorder, || {
            for i in 0..1000 {
                router.dispatch(&format!("X{i}"), "/");
            }
            router.dispatch("GET", "/");
            router.dispatch("POST", "/");
        });

        let series = recorder.series.lock().expect("lock");
        assert_eq!(series.len(), 3, "{series:?}");
        assert!(series.contains("router_dispatch_total{method=other,outcome=not_found}"));
        assert!(series.contains("router_dispatch_total{method=GET,outcome=found}"));
    }

    #[test]
    fn test_unescape_disabled() {
        let config = RouterConfig {
            unescape_path_values: false,
            ..RouterConfig::default()
        };
        let router = router(config, &[("GET", "/user/:name")]);
        match router.dispatch("GET", "/user/a%20b") {
            Dispatch::Found { params, .. } => assert_eq!(params.get("name"), Some("a%20b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_redirect_status() {
        let router = router(RouterConfig::default(), &[("GET", "/foo"), ("POST", "/bar/")]);

        assert_eq!(redirect(router.dispatch("GET", "/foo/")), Some(("/foo".into(), 301)));
        assert_eq!(redirect(router.dispatch("POST", "/bar")), Some(("/bar/".into(), 307)));
        assert!(matches!(router.dispatch("GET", "/baz"), Dispatch::NotFound));
    }

    #[test]
    fn test_no_redirect_for_connect_or_root() {
        let router = router(RouterConfig::default(), &[("CONNECT", "/tunnel"), ("GET", "/a"), ("GET", "/b")]);
        assert!(matches!(router.dispatch("CONNECT", "/tunnel/"), Dispatch::NotFound));
        assert!(matches!(router.dispatch("GET", "/"), Dispatch::NotFound));
    }

    #[test]
    fn test_trailing_slash_redirect_disabled() {
        let config = RouterConfig {
            redirect_trailing_slash: false,
            ..RouterConfig::default()
        };
        let router = router(config, &[("GET", "/foo")]);
        assert!(matches!(router.dispatch("GET", "/foo/"), Dispatch::NotFound));
    }

    #[test]
    fn test_fixed_path_redirect() {
        let config = RouterConfig {
            redirect_fixed_path: true,
            ..RouterConfig::default()
        };
        let router = router(config, &[("GET", "/foo/bar"), ("PUT", "/Docs/:page")]);

        assert_eq!(redirect(router.dispatch("GET", "/FOO/BAR")), Some(("/foo/bar".into(), 301)));
        assert_eq!(redirect(router.dispatch("GET", "/..//Foo//bar")), Some(("/foo/bar".into(), 301)));
        assert_eq!(redirect(router.dispatch("GET", "/FOO/BAR/")), Some(("/foo/bar".into(), 301)));
        assert_eq!(redirect(router.dispatch("PUT", "/docs/Intro")), Some(("/Docs/Intro".into(), 307)));
        assert!(matches!(router.dispatch("GET", "/foo/baz"), Dispatch::NotFound));
    }

    #[test]
    fn test_method_not_allowed() {
        let config = RouterConfig {
            handle_method_not_allowed: true,
            ..RouterConfig::default()
        };
        let router = router(
            config,
            &[("POST", "/path"), ("DELETE", "/path"), ("GET", "/other"), ("PUT", "/path/:id")],
        );

        match router.dispatch("GET", "/path") {
            Dispatch::MethodNotAllowed { allowed } => assert_eq!(allowed, ["POST", "DELETE"]),
            other => panic!("unexpected {other:?}"),
        }
        // method with no tree at all
        assert!(matches!(router.dispatch("PATCH", "/path"), Dispatch::MethodNotAllowed { .. }));
        assert!(matches!(router.dispatch("GET", "/nowhere"), Dispatch::NotFound));

        let mut router: Router<&str> = Router::default();
        router.add_route("POST", "/path", vec!["h"]).expect("insert");
        assert!(matches!(router.dispatch("GET", "/path"), Dispatch::NotFound));
    }

    #[test]
    fn test_route_logger_sees_registrations() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut router: Router<&str> = Router::default().with_route_logger(move |method, path, n| {
            sink.lock().expect("lock").push(format!("{method} {path} {n}"));
        });

        router.add_route("GET", "/a", vec!["auth", "a"]).expect("insert");
        router.add_route("POST", "/b/:id", vec!["b"]).expect("insert");

        assert_eq!(*seen.lock().expect("lock"), ["GET /a 2", "POST /b/:id 1"]);
    }

    #[test]
    fn test_get_and_delete() {
        let mut router = router(RouterConfig::default(), &[("GET", "/user/:id"), ("GET", "/user/:id/posts")]);

        assert!(router.get_handlers("GET", "/user/:id").is_some());
        assert!(router.get_handlers("POST", "/user/:id").is_none());
        assert!(router.get_handlers("GET", "user/:id").is_none());
        assert!(router.get_handlers("", "/user/:id").is_none());

        let chain = router.get_handlers("GET", "/user/:id").cloned().expect("registered");
        assert!(!router.del_route("POST", "/user/:id", &chain));
        assert!(router.del_route("GET", "/user/:id", &chain));
        assert!(router.lookup("GET", "/user/1", false).is_none());
        assert!(router.lookup("GET", "/user/1/posts", false).is_some());
    }

    #[test]
    fn test_routes_and_max_params() {
        let router = router(
            RouterConfig::default(),
            &[("GET", "/"), ("GET", "/src/:repo/*file"), ("POST", "/login")],
        );

        let routes = router.routes();
        assert_eq!(routes.len(), 3);
        assert_eq!(
            routes[2],
            RouteInfo {
                method: "POST".into(),
                path: "/login".into(),
                handlers: 1
            }
        );
        assert!(routes.iter().any(|r| r.path == "/src/:repo/*file"));
        assert_eq!(router.max_params(), 2);
    }
}
