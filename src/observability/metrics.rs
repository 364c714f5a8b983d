//! Metrics collection.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatch outcomes by method, outcome
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; without a recorder this is a no-op
//! - Labels kept low-cardinality: never the path, and methods the router has
//!   no tree for are reported as [`OTHER_METHOD`]

/// `method` label for requests whose method has no registered routes.
pub const OTHER_METHOD: &str = "other";

/// Counts one dispatch outcome.
pub fn record_dispatch(method: &str, outcome: &'static str) {
    ::metrics::counter!(
        "router_dispatch_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
