//! Configuration loading and resolution
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LOSTFOUND_CONFIG` environment variable
//! 3. `<config_dir>/lostfound/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable file is not fatal: the board starts with
//! compiled defaults and logs a warning.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "LOSTFOUND_CONFIG";

/// Default HTTP port for the board service
pub const DEFAULT_PORT: u16 = 5810;

/// Default poll interval for sheet sources (5 minutes)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub store: StoreConfig,
    /// Column mapping for spreadsheet sources
    pub columns: ColumnMapping,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Which backing store feeds the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Published spreadsheet fetched as CSV (read-only, polled)
    Sheet,
    /// Local document store (read/write, live change feed)
    #[default]
    Store,
}

impl std::str::FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheet" | "csv" => Ok(SourceKind::Sheet),
            "store" | "db" => Ok(SourceKind::Store),
            other => Err(Error::Config(format!("Unknown source kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Published CSV export URL (required for `kind = "sheet"`)
    pub sheet_url: Option<String>,
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            sheet_url: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            fetch_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Configured database path, or the platform default
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Optional token admin requests must present
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Declared column mapping: candidate names per canonical field
///
/// Lookup is case-insensitive on trimmed names and the first candidate with
/// a non-blank value wins. No substring guessing is performed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: Vec<String>,
    pub timestamp: Vec<String>,
    pub status: Vec<String>,
    pub approved: Vec<String>,
    pub name: Vec<String>,
    pub location: Vec<String>,
    pub description: Vec<String>,
    pub contact: Vec<String>,
    pub date: Vec<String>,
    /// Approval assumed when the record has no approval column
    pub approved_by_default: bool,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ColumnMapping {
    /// Preset for the published spreadsheet (form responses)
    pub fn spreadsheet() -> Self {
        Self {
            id: Vec::new(),
            timestamp: names(&["Timestamp"]),
            status: names(&["Status", "Type", "Lost or Found"]),
            approved: names(&["Approved"]),
            name: names(&["Item Name", "Item", "Name", "Title"]),
            location: names(&["Location", "Where"]),
            description: names(&["Description", "Details"]),
            contact: names(&["Contact Email", "Email", "Contact"]),
            date: names(&["Date", "Date Lost", "Date Found"]),
            approved_by_default: true,
        }
    }

    /// Preset for document store records
    pub fn document() -> Self {
        Self {
            id: names(&["id"]),
            timestamp: names(&["created_at"]),
            status: names(&["type"]),
            approved: names(&["approved"]),
            name: names(&["title"]),
            location: names(&["location"]),
            description: names(&["description"]),
            contact: names(&["user_email"]),
            date: names(&["date"]),
            approved_by_default: false,
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::spreadsheet()
    }
}

impl TomlConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load the file if one was resolved, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Could not load config {}: {}. Using compiled defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.source.kind == SourceKind::Sheet {
            let url = self.source.sheet_url.as_deref().unwrap_or("").trim();
            if url.is_empty() {
                return Err(Error::Config(
                    "source.sheet_url is required when source.kind = \"sheet\"".to_string(),
                ));
            }
        }
        if self.source.poll_interval_secs == 0 {
            return Err(Error::Config("source.poll_interval_secs must be > 0".to_string()));
        }
        if self.columns.name.is_empty() {
            return Err(Error::Config("columns.name must list at least one column".to_string()));
        }
        Ok(())
    }
}

/// Resolves which config file to load
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve the config file path, or None when no file applies
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let user_config = default_config_path()?;
        user_config.exists().then_some(user_config)
    }
}

/// `<config_dir>/lostfound/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lostfound").join("config.toml"))
}

/// `<data_local_dir>/lostfound/lostfound.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lostfound"))
        .unwrap_or_else(|| PathBuf::from("./lostfound_data"))
        .join("lostfound.db")
}
