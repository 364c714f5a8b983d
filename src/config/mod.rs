//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! route table file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → loader.rs build_router (register routes in file order)
//!     → Router<String>, published through SharedRouter
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new table
//!     → validation.rs validates
//!     → channel → caller rebuilds and swaps the router
//! ```
//!
//! # Design Decisions
//! - A table is immutable once loaded; changes require a full reload
//! - All sections have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_router, load_config, ConfigError};
pub use schema::{ObservabilityConfig, RouteConfig, RouteTableConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
