//! Reference command handlers for the KEEL console.
//!
//! Handlers are started by name from the configuration through a fixed
//! constructor table. An unknown name fails startup before any handler is
//! spawned.

mod cluster;
mod config;
mod database;
mod exit;
mod help;
pub mod persistence;


use std::sync::Arc;

use keel_console::options::OptionError;
use keel_console::path::{CommandPath, PathError};
use keel_console::pipeline::PipelineBuilder;
use keel_types::config::KeelConfig;
use keel_types::error::{KeelError, Result};
use keel_types::model::{ClusterView, StaticClusterView};

/// `cluster list` handler.
pub use cluster::ClusterHandler;
/// `config` handler.
pub use config::ConfigHandler;
/// `database` handler.
pub use database::DatabaseHandler;
/// `exit` / `quit` handler.
pub use exit::ExitHandler;
/// `help` handler.
pub use help::HelpHandler;
/// In-memory persistence service.
pub use persistence::{MemoryStore, PersistenceCall, PersistenceRef, spawn_memory_store};

/// Collaborators the handlers may need.
pub struct HandlerDeps {
    pub config: KeelConfig,
    pub cluster: Arc<dyn ClusterView>,
    pub persistence: Option<PersistenceRef>,
}

impl HandlerDeps {
    /// Cluster view taken from the configuration's static member list.
    pub fn from_config(config: KeelConfig, persistence: Option<PersistenceRef>) -> Self {
        let cluster = Arc::new(StaticClusterView::new(config.cluster.members.clone()));
        Self {
            config,
            cluster,
            persistence,
        }
    }
}

type Constructor = fn(&HandlerDeps, &mut PipelineBuilder) -> Result<()>;

fn start_help(_: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    builder.spawn_handler(HelpHandler);
    Ok(())
}

fn start_exit(_: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    builder.spawn_handler(ExitHandler);
    Ok(())
}

fn start_config(deps: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    builder.spawn_handler(ConfigHandler::new(deps.config.clone()));
    Ok(())
}

fn start_cluster(deps: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    builder.spawn_handler(ClusterHandler::new(Arc::clone(&deps.cluster)));
    Ok(())
}

fn start_database(deps: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    let persistence = deps.persistence.clone().ok_or_else(|| {
        KeelError::Config("the database handler needs a persistence service".into())
    })?;
    builder.spawn_handler(DatabaseHandler::new(persistence));
    Ok(())
}

static HANDLERS: &[(&str, Constructor)] = &[
    ("help", start_help),
    ("exit", start_exit),
    ("config", start_config),
    ("cluster", start_cluster),
    ("database", start_database),
];

/// Names accepted by [`install`].
pub fn handler_names() -> impl Iterator<Item = &'static str> {
    HANDLERS.iter().map(|(name, _)| *name)
}

fn constructor(name: &str) -> Result<Constructor> {
    HANDLERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .ok_or_else(|| KeelError::UnknownHandler(name.to_string()))
}

/// Spawn the named handlers into `builder`.
///
/// Every name is checked before anything is spawned. Must be called from
/// within a tokio runtime.
pub fn install(names: &[String], deps: &HandlerDeps, builder: &mut PipelineBuilder) -> Result<()> {
    let constructors = names
        .iter()
        .map(|name| constructor(name.trim()))
        .collect::<Result<Vec<_>>>()?;
    for (name, construct) in names.iter().zip(constructors) {
        construct(deps, builder)?;
        log::info!("Started handler '{}'", name.trim());
    }
    Ok(())
}

pub(crate) fn command_path(text: &str) -> Result<CommandPath> {
    text.parse()
        .map_err(|e: PathError| KeelError::Handler(format!("bad command path {text:?}: {e}")))
}

pub(crate) fn option_error(e: OptionError) -> KeelError {
    KeelError::Handler(e.to_string())
}
