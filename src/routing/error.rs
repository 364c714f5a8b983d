//! Route registration errors.
//!
//! Lookup misses are not errors: `get_value` reports them through an empty
//! handler slot and the trailing-slash flag.

use thiserror::Error;

/// Errors raised while registering a route.
///
/// Every variant is fatal to the registration call only; the tree is left in
/// the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("HTTP method can not be empty")]
    EmptyMethod,

    #[error("path must begin with '/': {0:?}")]
    InvalidPath(String),

    #[error("there must be at least one handler for {0:?}")]
    EmptyHandlers(String),

    #[error("wildcards must be named with a non-empty name in path {0:?}")]
    EmptyWildcardName(String),

    #[error("only one wildcard per path segment is allowed, has {segment:?} in path {path:?}")]
    MultipleWildcardsInSegment { segment: String, path: String },

    #[error("catch-all routes are only allowed at the end of the path in {0:?}")]
    CatchAllNotLast(String),

    #[error("no / before catch-all in path {0:?}")]
    CatchAllWithoutSlash(String),

    #[error("duplicate parameter name {name:?} in path {path:?}")]
    DuplicateParamName { name: String, path: String },

    #[error("{segment:?} in new path {path:?} conflicts with existing {existing:?}")]
    WildcardConflict {
        segment: String,
        path: String,
        existing: String,
    },
}
