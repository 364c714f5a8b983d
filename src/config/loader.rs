//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouteTableConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{RouteError, Router};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route {method} {path} rejected: {source}")]
    Route {
        method: String,
        path: String,
        #[source]
        source: RouteError,
    },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a route table from TOML text.
pub fn parse_config(content: &str) -> Result<RouteTableConfig, ConfigError> {
    let config: RouteTableConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a route table from a TOML file.
pub fn load_config(path: &Path) -> Result<RouteTableConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Registers every configured route, in file order, on a fresh router.
///
/// Handlers are identified by name. The first rejected route aborts the build.
pub fn build_router(config: &RouteTableConfig) -> Result<Router<String>, ConfigError> {
    let mut router = Router::new(config.router.clone());

    for route in &config.routes {
        router
            .add_route(&route.method, &route.path, route.handlers.clone())
            .map_err(|source| ConfigError::Route {
                method: route.method.clone(),
                path: route.path.clone(),
                source,
            })?;
    }

    tracing::info!(routes = config.routes.len(), "Router built");
    Ok(router)
}
