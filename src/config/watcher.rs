//! Route table watcher for hot reload.
//!
//! Each change event re-reads and validates the whole table. Only tables
//! that pass validation and differ from the last one delivered are sent on;
//! a rejected table leaves the serving router untouched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::RouteTableConfig;

/// Watches a route table file and delivers each new valid table.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteTableConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for validated route tables.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteTableConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Starts watching. Events arrive on notify's background thread.
    ///
    /// The returned handle must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let mut last: Option<RouteTableConfig> = None;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(table) = reload(&path, &mut last) {
                        if tx.send(table).is_err() {
                            tracing::debug!(path = ?path, "Route table receiver dropped");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(path = ?path, error = %e, "Route table watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route table watcher started");
        Ok(watcher)
    }
}

/// Reads the table at `path`, returning it only when it is valid and differs
/// from `last`. A rewrite often fires several events for the same content.
fn reload(path: &Path, last: &mut Option<RouteTableConfig>) -> Option<RouteTableConfig> {
    match load_config(path) {
        Ok(table) if last.as_ref() == Some(&table) => {
            tracing::debug!(path = ?path, "Route table unchanged");
            None
        }
        Ok(table) => {
            tracing::info!(path = ?path, routes = table.routes.len(), "Route table reloaded");
            *last = Some(table.clone());
            Some(table)
        }
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                tracing::warn!(path = ?path, error = %error, "Rejected route");
            }
            tracing::error!(
                path = ?path,
                errors = errors.len(),
                "Route table failed validation. Keeping current routes."
            );
            None
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload route table. Keeping current routes.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_table(content: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("route-tree-watcher-{}-{}.toml", std::process::id(), n));
        std::fs::write(&path, content).unwrap();
        path
    }

    const ONE_ROUTE: &str = r#"
[[routes]]
method = "GET"
path = "/a"
handlers = ["a"]
"#;

    const TWO_ROUTES: &str = r#"
[[routes]]
method = "GET"
path = "/a"
handlers = ["a"]

[[routes]]
method = "GET"
path = "/b/:id"
handlers = ["b"]
"#;

    #[test]
    fn test_reload_skips_unchanged_table() {
        let path = temp_table(ONE_ROUTE);
        let mut last = None;

        let first = reload(&path, &mut last).expect("first read delivers");
        assert_eq!(first.routes.len(), 1);
        assert!(reload(&path, &mut last).is_none());

        std::fs::write(&path, TWO_ROUTES).unwrap();
        assert_eq!(reload(&path, &mut last).map(|t| t.routes.len()), Some(2));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_reload_rejects_invalid_table() {
        let path = temp_table(ONE_ROUTE);
        let mut last = None;
        reload(&path, &mut last).expect("valid table");

        std::fs::write(&path, "[[routes]]\nmethod = \"get\"\npath = \"nope\"\nhandlers = []\n").unwrap();
        assert!(reload(&path, &mut last).is_none());
        assert_eq!(last.as_ref().map(|t| t.routes.len()), Some(1));

        // restoring the previous content is not a change
        std::fs::write(&path, ONE_ROUTE).unwrap();
        assert!(reload(&path, &mut last).is_none());

        std::fs::remove_file(&path).ok();
    }
}
