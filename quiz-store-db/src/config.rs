//! Store configuration, read from `~/.config/quiz-store/config.toml`.
//!
//! ```toml
//! database = "/var/lib/quiz/quizes.sqlite"
//! document_prefix = "quiz_"
//! default_language = "en"
//! language = "pl"
//!
//! [documents]
//! quiz_de = "documents/quiz_de.xml"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quiz_store_document::{
    DEFAULT_LANGUAGE, DEFAULT_PREFIX, DocumentLoader, DocumentRegistry, DocumentResource,
    system_language,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the database file under the data directory.
pub const DATABASE_NAME: &str = "quizes.sqlite";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Config parse error in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. Defaults to [`default_database_path`].
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default = "default_prefix")]
    pub document_prefix: String,
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Requested language. Defaults to the process locale.
    #[serde(default)]
    pub language: Option<String>,
    /// Extra documents by key; these replace bundled documents with the same key.
    #[serde(default)]
    pub documents: BTreeMap<String, PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: None,
            document_prefix: default_prefix(),
            default_language: default_language(),
            language: None,
            documents: BTreeMap::new(),
            base_dir: None,
        }
    }
}

impl StoreConfig {
    /// The database file this configuration opens.
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => self.resolve(path),
            None => default_database_path(),
        }
    }

    /// Language to request: configured, else the process locale, else the default.
    pub fn language(&self) -> String {
        self.language
            .clone()
            .or_else(system_language)
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Build a loader over the bundled documents plus the configured ones.
    pub fn document_loader(&self) -> DocumentLoader {
        let mut registry = DocumentRegistry::bundled();
        for (key, path) in &self.documents {
            if registry
                .register(key.clone(), DocumentResource::File(self.resolve(path)))
                .is_some()
            {
                log::debug!("Configured document '{key}' replaces the bundled one");
            }
        }
        DocumentLoader::new(registry, &self.document_prefix, &self.default_language)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Returns `~/.config/quiz-store/config.toml`.
pub fn config_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("quiz-store").join("config.toml")
}

/// Returns `~/.local/share/quiz-store/quizes.sqlite` (or the platform equivalent).
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("quiz-store").join(DATABASE_NAME)
}

/// Load a configuration file. Relative paths inside it resolve against its directory.
pub fn load_config(path: &Path) -> Result<StoreConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut config: StoreConfig = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
///
/// The file is written next to its destination and renamed into place, so a
/// failed write never leaves a truncated config behind.
pub fn save_config(path: &Path, config: &StoreConfig) -> Result<(), ConfigError> {
    let io_error = |source: std::io::Error| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let serialized = toml::to_string_pretty(config)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, serialized).map_err(io_error)?;
    std::fs::rename(&tmp, path).map_err(io_error)?;
    Ok(())
}

/// Load the configuration from [`config_path`], returning defaults if missing or corrupt.
pub fn load_or_default() -> StoreConfig {
    let path = config_path();
    if !path.exists() {
        return StoreConfig::default();
    }
    load_config(&path).unwrap_or_else(|e| {
        log::warn!("{e}");
        StoreConfig::default()
    })
}
