//! Configuration for shelfmark paths and the search provider.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SHELFMARK_HOME, SHELFMARK_CATALOG)
//! 2. Config file (.shelfmark/config.yaml)
//! 3. Defaults (~/.shelfmark)
//!
//! Config file discovery:
//! - Searches current directory and parents for .shelfmark/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default volumes search endpoint
pub const DEFAULT_PROVIDER_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to config file)
    pub home: Option<String>,
    /// Catalog file (relative to config file)
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to shelfmark home (state)
    pub home: PathBuf,
    /// Absolute path to the catalog file
    pub catalog: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Search provider settings
    pub provider: ProviderSettings,
}

/// Settings for the search provider client
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".shelfmark").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".shelfmark");

    // Check for config file
    let config_file = find_config_file();

    let (home, catalog, provider) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .shelfmark/ (i.e., grandparent
        // of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        // Resolve home path
        let home = if let Ok(env_home) = std::env::var("SHELFMARK_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            // home is relative to the .shelfmark/ directory
            let shelfmark_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(shelfmark_dir, home_path)
        } else {
            default_home.clone()
        };

        // Resolve catalog path
        let catalog = if let Ok(env_catalog) = std::env::var("SHELFMARK_CATALOG") {
            PathBuf::from(env_catalog)
        } else if let Some(ref catalog_path) = config.paths.catalog {
            resolve_path(base_dir, catalog_path)
        } else {
            home.join("books.json")
        };

        // Provider settings
        let defaults = ProviderSettings::default();
        let provider = ProviderSettings {
            base_url: config
                .provider
                .as_ref()
                .and_then(|p| p.base_url.clone())
                .unwrap_or(defaults.base_url),
            timeout_seconds: config
                .provider
                .as_ref()
                .and_then(|p| p.timeout_seconds)
                .unwrap_or(defaults.timeout_seconds),
        };

        (home, catalog, provider)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("SHELFMARK_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let catalog = std::env::var("SHELFMARK_CATALOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("books.json"));

        (home, catalog, ProviderSettings::default())
    };

    Ok(ResolvedConfig {
        home,
        catalog,
        config_file,
        provider,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the shelfmark home directory (state).
pub fn shelfmark_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the catalog file path ($SHELFMARK_HOME/books.json by default)
pub fn catalog_path() -> Result<PathBuf> {
    Ok(config()?.catalog.clone())
}

/// Get the search provider settings
pub fn provider_settings() -> Result<ProviderSettings> {
    Ok(config()?.provider.clone())
}
