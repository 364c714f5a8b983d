//! Compact radix-tree HTTP router.
//!
//! Maps an HTTP method and URL path to an ordered chain of handlers. Patterns
//! may contain static text, `:name` single-segment parameters and a trailing
//! `*name` catch-all. Ambiguous patterns are rejected when registered.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::RouteTableConfig;
pub use routing::{Dispatch, HandlersChain, Params, RouteError, Router, RouterConfig, SharedRouter};
