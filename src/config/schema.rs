//! Configuration schema definitions.
//!
//! This module defines the route table file layout. All types derive Serde
//! traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

pub use crate::routing::router::RouterConfig;

/// Root of a route table file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteTableConfig {
    /// Dispatch behavior switches.
    pub router: RouterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, registered in file order.
    pub routes: Vec<RouteConfig>,
}

/// A single `[[routes]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method token (e.g., "GET").
    pub method: String,

    /// Route pattern, e.g. "/user/:id" or "/static/*filepath".
    pub path: String,

    /// Handler names, outermost first; the last one is the endpoint.
    pub handlers: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
