//! YAML configuration for sql-seeder.
//!
//! Looked up in this order: an explicit `--config` path, `sql-seeder.yaml`
//! in the working directory, `<config dir>/sql-seeder/config.yaml`. Missing
//! files fall back to defaults.

use crate::printer::{DEFAULT_CHUNK_SIZE, DEFAULT_INDENT};
use crate::registrar::{Registrar, DEFAULT_END_MARKER, DEFAULT_START_MARKER};
use crate::template::{TemplateStyle, DEFAULT_INSERT_COMMAND};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = "sql-seeder.yaml";
pub const DEFAULT_CONNECTION: &str = "default";

/// Marker comments around the registered calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub start: String,
    pub end: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// A named database connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// DuckDB database file (None = in-memory)
    pub path: Option<PathBuf>,
    /// SQL script run after opening, e.g. to load a fixture
    pub init: Option<PathBuf>,
}

/// Complete YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeederConfig {
    /// Directory the seeder classes are written to
    pub output_dir: PathBuf,
    /// Aggregator file that lists the seeders to run
    pub seeder_path: PathBuf,
    /// Register generated seeders in the aggregator
    pub seeder_modification: bool,
    /// Maximum rows per insert statement
    pub chunk_size: usize,
    /// Custom template (None = bundled stub)
    pub stub_path: Option<PathBuf>,
    /// Insert line format: table accessor, then array literal
    pub insert_command: String,
    pub indent: String,
    pub newline: String,
    pub markers: MarkerConfig,
    pub default_connection: String,
    pub connections: BTreeMap<String, ConnectionConfig>,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("database/seeders"),
            seeder_path: PathBuf::from("database/seeders/DatabaseSeeder.php"),
            seeder_modification: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            stub_path: None,
            insert_command: DEFAULT_INSERT_COMMAND.to_string(),
            indent: DEFAULT_INDENT.to_string(),
            newline: "\n".to_string(),
            markers: MarkerConfig::default(),
            default_connection: DEFAULT_CONNECTION.to_string(),
            connections: BTreeMap::new(),
        }
    }
}

impl SeederConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the configuration for this run.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }

        if let Some(global) = Self::user_config_path() {
            if global.is_file() {
                return Self::load(&global);
            }
        }

        Ok(Self::default())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sql-seeder").join("config.yaml"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than 0");
        }
        if self.insert_command.matches("%s").count() != 2 {
            anyhow::bail!(
                "insert_command must contain exactly two %s placeholders: {}",
                self.insert_command
            );
        }
        if self.markers.start.is_empty() || self.markers.end.is_empty() {
            anyhow::bail!("markers must not be empty");
        }
        Ok(())
    }

    /// Connection settings by name. The default connection may be implicit.
    pub fn connection(&self, name: &str) -> anyhow::Result<ConnectionConfig> {
        match self.connections.get(name) {
            Some(conn) => Ok(conn.clone()),
            None if name == self.default_connection => Ok(ConnectionConfig::default()),
            None => anyhow::bail!(
                "Unknown connection: {}. Configured connections: {}",
                name,
                self.connections
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    pub fn is_default_connection(&self, name: &str) -> bool {
        name == self.default_connection
    }

    pub fn template_style(&self, indexed: bool) -> TemplateStyle {
        TemplateStyle {
            indent: self.indent.clone(),
            newline: self.newline.clone(),
            insert_command: self.insert_command.clone(),
            indexed,
        }
    }

    pub fn registrar(&self) -> Registrar {
        Registrar {
            start_marker: self.markers.start.clone(),
            end_marker: self.markers.end.clone(),
            indent: self.indent.clone(),
            newline: self.newline.clone(),
        }
    }
}
