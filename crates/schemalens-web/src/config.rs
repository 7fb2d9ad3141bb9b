//! Configuration for the SchemaLens server.

use anyhow::{Context, Result};
use schemalens_core::hierarchy::TypeInfo;
use schemalens_core::{BuildConfig, TypeHierarchy};
use schemalens_neo4j::Neo4jConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "schemalens.toml";

/// SchemaLens server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub build: BuildSection,
    /// Per-label overrides of the built-in type hierarchy.
    #[serde(default)]
    pub hierarchy: HashMap<String, TypeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default = "default_label_sets_timeout_secs")]
    pub label_sets_timeout_secs: u64,
    #[serde(default = "default_example_limit")]
    pub example_limit: usize,
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u64,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_concurrency() -> usize { 8 }
fn default_query_timeout_secs() -> u64 { 30 }
fn default_label_sets_timeout_secs() -> u64 { 600 }
fn default_example_limit() -> usize { 10 }
fn default_recent_window_days() -> u64 { 365 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            query_timeout_secs: default_query_timeout_secs(),
            label_sets_timeout_secs: default_label_sets_timeout_secs(),
            example_limit: default_example_limit(),
            recent_window_days: default_recent_window_days(),
        }
    }
}

impl BuildSection {
    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            concurrency: self.concurrency,
            query_timeout: Duration::from_secs(self.query_timeout_secs),
            label_sets_timeout: Duration::from_secs(self.label_sets_timeout_secs),
            example_limit: self.example_limit,
            recent_window: Duration::from_secs(self.recent_window_days.saturating_mul(24 * 60 * 60)),
        }
    }
}

impl Config {
    /// Load config from `path`, or from schemalens.toml in the current or
    /// parent directories. Falls back to defaults when neither exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config
            .build
            .to_build_config()
            .validate()
            .context("Invalid [build] section")?;
        anyhow::ensure!(
            config.neo4j.timeout_secs > 0,
            "Invalid [neo4j] section: timeout_secs must be positive"
        );
        Ok(config)
    }

    /// The built-in hierarchy with the configured overrides applied.
    pub fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::builtin().merge(self.hierarchy.clone())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Find schemalens.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
