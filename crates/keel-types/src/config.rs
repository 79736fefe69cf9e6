//! Console configuration.
//!
//! Loaded from a TOML file at startup. Every field has a default so an empty
//! file (or no file at all) yields a working reference console.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeelError, Result};
use crate::model::ClusterMember;

/// Handler names enabled when the configuration does not list any.
pub const DEFAULT_HANDLERS: &[&str] = &["help", "exit", "config", "cluster", "database"];

/// Top-level console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeelConfig {
    /// Prompt printed before every input line.
    pub prompt: String,
    /// Optional banner printed once when the session starts.
    pub banner: Option<String>,
    /// Hold lookups until every handler has answered the registration
    /// broadcast. When `false`, early lookups may see a partial registry.
    pub await_registrations: bool,
    /// Default `env_logger` filter (overridden by `RUST_LOG`).
    pub log_filter: String,
    /// Command handlers to start, by name.
    pub handlers: Vec<String>,
    /// Static cluster snapshot served by `cluster list`.
    pub cluster: ClusterConfig,
}

impl Default for KeelConfig {
    fn default() -> Self {
        Self {
            prompt: "keel> ".to_string(),
            banner: Some("KEEL cluster console -- type 'help' for commands".to_string()),
            await_registrations: true,
            log_filter: "info".to_string(),
            handlers: DEFAULT_HANDLERS.iter().map(|h| (*h).to_string()).collect(),
            cluster: ClusterConfig::default(),
        }
    }
}

/// Static description of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster name shown in listings.
    pub name: String,
    /// Members reported by the snapshot view.
    pub members: Vec<ClusterMember>,
}

impl KeelConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Render the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the console cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.handlers.is_empty() {
            return Err(KeelError::Config("no command handlers configured".into()));
        }
        if let Some(name) = self.handlers.iter().find(|h| h.trim().is_empty()) {
            return Err(KeelError::Config(format!("blank handler name: {name:?}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = KeelConfig::from_toml("").unwrap();
        assert_eq!(config, KeelConfig::default());
        assert!(config.await_registrations);
        assert_eq!(config.handlers.len(), DEFAULT_HANDLERS.len());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = KeelConfig::from_toml(
            r#"
            prompt = "ops$ "
            await_registrations = false
            handlers = ["help", "exit"]
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt, "ops$ ");
        assert!(!config.await_registrations);
        assert_eq!(config.handlers, vec!["help", "exit"]);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn cluster_members_parse() {
        let config = KeelConfig::from_toml(
            r#"
            [cluster]
            name = "prod"

            [[cluster.members]]
            address = "10.0.0.1:2552"
            protocol = "tcp"
            status = "up"
            roles = ["seed", "backend"]
            "#,
        )
        .unwrap();
        assert_eq!(config.cluster.name, "prod");
        assert_eq!(config.cluster.members.len(), 1);
        assert_eq!(config.cluster.members[0].roles, vec!["seed", "backend"]);
    }

    #[test]
    fn empty_handler_list_rejected() {
        let err = KeelConfig::from_toml("handlers = []").unwrap_err();
        assert!(format!("{err}").contains("no command handlers"));
    }

    #[test]
    fn blank_handler_name_rejected() {
        assert!(KeelConfig::from_toml(r#"handlers = ["help", " "]"#).is_err());
    }

    #[test]
    fn invalid_toml_is_error() {
        assert!(matches!(
            KeelConfig::from_toml("prompt = ["),
            Err(KeelError::TomlParse(_))
        ));
    }

    #[test]
    fn to_toml_round_trips() {
        let mut config = KeelConfig::default();
        config.cluster.members.push(ClusterMember {
            address: "10.0.0.2:2552".into(),
            protocol: "tcp".into(),
            status: "joining".into(),
            roles: vec!["backend".into()],
        });
        let text = config.to_toml().unwrap();
        assert_eq!(KeelConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = KeelConfig::load(Path::new("/nonexistent/keel.toml")).unwrap_err();
        assert!(matches!(err, KeelError::Io(_)));
    }

    #[test]
    fn example_config_parses() {
        let config = KeelConfig::from_toml(include_str!("../../../keel.example.toml")).unwrap();
        assert_eq!(config.cluster.name, "demo");
        assert_eq!(config.cluster.members.len(), 2);
        assert_eq!(config.cluster.members[0].roles, ["seed"]);
        assert!(config.cluster.members[1].roles.is_empty());
    }
}
