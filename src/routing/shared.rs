//! Hot-swappable router handle.
//!
//! # Design Decisions
//! - Readers take a snapshot with `load()`; no lock, no blocking on reloads
//! - Writers build a complete `Router` off to the side and `store()` it
//! - A snapshot stays valid for as long as the reader holds it

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::router::Router;

/// A router shared between request workers and a reconfiguration task.
pub struct SharedRouter<H> {
    inner: ArcSwap<Router<H>>,
}

impl<H> SharedRouter<H> {
    pub fn new(router: Router<H>) -> Self {
        Self {
            inner: ArcSwap::from_pointee(router),
        }
    }

    /// Current router snapshot.
    pub fn load(&self) -> Arc<Router<H>> {
        self.inner.load_full()
    }

    /// Publishes a new router; in-flight snapshots keep the old one alive.
    pub fn store(&self, router: Router<H>) {
        self.inner.store(Arc::new(router));
        tracing::info!("Router swapped");
    }
}

impl<H> From<Router<H>> for SharedRouter<H> {
    fn from(router: Router<H>) -> Self {
        Self::new(router)
    }
}
