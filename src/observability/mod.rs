//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing produces:
//!     → route registrations (injected logger, tracing by default)
//!     → dispatch outcomes → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout), installed by the binary
//!     → whatever `metrics` recorder the embedding service installs
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing subscribers and recorders is
//!   left to the binary
//! - Metrics are cheap (a counter increment, no-op without a recorder)

pub mod logging;
pub mod metrics;
