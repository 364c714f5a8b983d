//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup or reload):
//!     (method, pattern, handlers)
//!     → router.rs (validate, log, pick method tree)
//!     → node.rs (conflict check, then split/insert)
//!
//! Request:
//!     (method, path)
//!     → router.rs (method tree)
//!     → node.rs (radix walk with backtracking, params)
//!     → Found | Redirect | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - One compact radix tree per HTTP method
//! - Static, `:param` and `*catchall` segments; ambiguity rejected at registration
//! - Lookup is allocation-free apart from the params buffer
//! - Routers are immutable once shared; reloads swap whole routers

pub mod error;
pub mod node;
pub mod params;
pub mod path;
pub mod router;
pub mod shared;
pub mod tree;

pub use error::RouteError;
pub use node::{HandlersChain, Node, NodeType, Value};
pub use params::{Param, Params};
pub use path::clean_path;
pub use router::{Dispatch, RouteInfo, Router, RouterConfig};
pub use shared::SharedRouter;
pub use tree::{MethodTree, MethodTrees};
