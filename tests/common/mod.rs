//! Shared helpers for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use route_tree::routing::{Dispatch, Router, RouterConfig};

/// Build a router whose handler chain for each route is `[path]`.
#[allow(dead_code)]
pub fn router_with(config: RouterConfig, routes: &[(&str, &str)]) -> Router<String> {
    let mut router = Router::new(config);
    for &(method, path) in routes {
        router
            .add_route(method, path, vec![path.to_string()])
            .unwrap_or_else(|e| panic!("{method} {path}: {e}"));
    }
    router
}

/// Pattern that served the request, with its params as owned pairs.
#[allow(dead_code)]
pub fn resolve(router: &Router<String>, method: &str, path: &str) -> Option<(String, Vec<(String, String)>)> {
    match router.dispatch(method, path) {
        Dispatch::Found { handlers, params } => Some((handlers.last()?.clone(), params.to_pairs())),
        _ => None,
    }
}

/// Fresh path under the system temp dir, unique per test process and call.
#[allow(dead_code)]
pub fn temp_file(name: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("route-tree-{}-{}-{}", std::process::id(), n, name))
}

/// A small GitHub-like API used across test files.
#[allow(dead_code)]
pub const API_ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/authorizations"),
    ("GET", "/authorizations/:id"),
    ("POST", "/authorizations"),
    ("DELETE", "/authorizations/:id"),
    ("GET", "/applications/:client_id/tokens/:access_token"),
    ("DELETE", "/applications/:client_id/tokens"),
    ("GET", "/events"),
    ("GET", "/repos/:owner/:repo/events"),
    ("GET", "/networks/:owner/:repo/events"),
    ("GET", "/orgs/:org/events"),
    ("GET", "/users/:user/received_events"),
    ("GET", "/users/:user/received_events/public"),
    ("GET", "/users/:user/events"),
    ("GET", "/users/:user/events/public"),
    ("GET", "/users/:user/events/orgs/:org"),
    ("GET", "/feeds"),
    ("GET", "/notifications"),
    ("GET", "/repos/:owner/:repo/notifications"),
    ("PUT", "/notifications"),
    ("GET", "/static/*filepath"),
    ("GET", "/gists/:id/star"),
    ("PUT", "/gists/:id/star"),
];
