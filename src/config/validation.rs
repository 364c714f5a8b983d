//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check method tokens, path shape and handler lists
//! - Detect duplicate routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouteTableConfig → Result<(), Vec<ValidationError>>
//! - Pattern conflicts are left to the tree, which reports them on registration

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouteTableConfig;

/// A semantic problem with one route table entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routes[{index}]: method {method:?} must be a non-empty uppercase token")]
    InvalidMethod { index: usize, method: String },

    #[error("routes[{index}]: path {path:?} must begin with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("routes[{index}]: {method} {path} has no handlers")]
    EmptyHandlers { index: usize, method: String, path: String },

    #[error("routes[{index}]: {method} {path} is already defined")]
    DuplicateRoute { index: usize, method: String, path: String },

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Checks a parsed route table, collecting every error.
pub fn validate_config(config: &RouteTableConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    for (index, route) in config.routes.iter().enumerate() {
        if !is_method_token(&route.method) {
            errors.push(ValidationError::InvalidMethod {
                index,
                method: route.method.clone(),
            });
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                index,
                path: route.path.clone(),
            });
        }
        if route.handlers.is_empty() {
            errors.push(ValidationError::EmptyHandlers {
                index,
                method: route.method.clone(),
                path: route.path.clone(),
            });
        }
        if !seen.insert((route.method.as_str(), route.path.as_str())) {
            errors.push(ValidationError::DuplicateRoute {
                index,
                method: route.method.clone(),
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_method_token(method: &str) -> bool {
    !method.is_empty() && method.bytes().all(|b| b.is_ascii_uppercase())
}
