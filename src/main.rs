//! `route-tree` command line tool.
//!
//! Loads a TOML route table into the radix-tree router and either lists the
//! registered routes, resolves a single request, or keeps a live router in
//! sync with the file.
//!
//! ```text
//! route-tree routes  routes.toml
//! route-tree resolve routes.toml GET /user/42
//! route-tree watch   routes.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use route_tree::config::{build_router, load_config, ConfigWatcher};
use route_tree::observability::logging;
use route_tree::routing::{Dispatch, SharedRouter};

#[derive(Parser)]
#[command(name = "route-tree")]
#[command(about = "Inspect and serve radix-tree HTTP route tables", long_about = None)]
struct Cli {
    /// Log level, overriding the route table's `observability.log_level`
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered route as JSON
    Routes { file: PathBuf },
    /// Resolve one request against the table
    Resolve {
        file: PathBuf,
        method: String,
        path: String,
    },
    /// Keep a router in sync with the file until Ctrl+C
    Watch { file: PathBuf },
}

impl Commands {
    fn file(&self) -> &PathBuf {
        match self {
            Commands::Routes { file } | Commands::Resolve { file, .. } | Commands::Watch { file } => file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let table = load_config(cli.command.file())?;
    logging::init(cli.log_level.as_deref().unwrap_or(&table.observability.log_level));

    let router = build_router(&table)?;

    match cli.command {
        Commands::Routes { .. } => {
            println!("{}", serde_json::to_string_pretty(&router.routes())?);
        }
        Commands::Resolve { method, path, .. } => {
            let outcome = describe(router.dispatch(&method, &path));
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Watch { file } => {
            let shared = SharedRouter::new(router);
            let (watcher, mut updates) = ConfigWatcher::new(&file);
            let _watcher = watcher.run()?;

            tracing::info!(path = ?file, "Watching route table, press Ctrl+C to stop");
            loop {
                tokio::select! {
                    Some(table) = updates.recv() => match build_router(&table) {
                        Ok(router) => {
                            shared.store(router);
                            tracing::info!(routes = shared.load().routes().len(), "Route table reloaded");
                        }
                        Err(e) => {
                            tracing::error!("Rejected reloaded route table: {}. Keeping current routes.", e);
                        }
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn describe(dispatch: Dispatch<'_, '_, String>) -> Value {
    match dispatch {
        Dispatch::Found { handlers, params } => json!({
            "outcome": "found",
            "status": 200,
            "handlers": &handlers[..],
            "params": params
                .iter()
                .map(|p| json!({ "key": p.key, "value": p.value }))
                .collect::<Vec<_>>(),
        }),
        Dispatch::Redirect { location, status } => json!({
            "outcome": "redirect",
            "status": status,
            "location": location,
        }),
        Dispatch::MethodNotAllowed { allowed } => json!({
            "outcome": "method_not_allowed",
            "status": 405,
            "allowed": allowed,
        }),
        Dispatch::NotFound => json!({
            "outcome": "not_found",
            "status": 404,
        }),
    }
}
