//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/matchgraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.matchgraph.toml`
//! 3. Environment variables: `MATCHGRAPH_*`
//!
//! # Intended Usage
//!
//! **Global config** (`~/.config/matchgraph/config.toml`):
//! ```toml
//! [neo4j]
//! uri = "bolt://localhost:7687"
//! user = "neo4j"
//! password = "secret"
//! timeout = 30
//! ```
//!
//! Environment variables are split on `_`, so `MATCHGRAPH_NEO4J_PASSWORD`
//! overrides `neo4j.password`. Key names therefore never contain underscores.

use std::ops::Deref;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub neo4j: Neo4jConfig,
}

/// Neo4j connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI (required).
    /// Example: `bolt://localhost:7687`
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Database name. The server default database is used when absent.
    #[serde(default)]
    pub database: Option<String>,
    /// Per-operation deadline in seconds. `0` disables the deadline.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Maximum pooled connections.
    #[serde(default = "default_connections")]
    pub connections: usize,
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connections() -> usize {
    16
}

impl Neo4jConfig {
    /// Returns the operation deadline, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered figment used by [`Config::load`].
    pub fn figment() -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".matchgraph.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("MATCHGRAPH_").split("_"))
    }

    /// User config path: ~/.config/matchgraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("matchgraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("matchgraph").join("config.toml"))
            .unwrap_or_default()
    }
}
