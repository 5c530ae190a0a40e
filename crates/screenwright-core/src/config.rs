//! Editor configuration, loaded from a TOML file under the platform
//! config directory. `#[serde(default)]` keeps old config files valid
//! when fields are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behavior.
    pub editor: EditorConfig,

    /// Auto-format engine settings.
    pub autoformat: AutoFormatConfig,

    /// PDF export settings.
    pub export: ExportConfig,

    /// Persistence settings.
    pub storage: StorageConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults
    /// on any error.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("screenwright").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Resolves the screenplay data directory, creating nothing.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("screenwright"))
    }
}

/// Editing behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history limit in edit groups.
    pub undo_limit: usize,

    /// Window in milliseconds within which consecutive typing merges
    /// into one undo step.
    pub undo_coalesce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 1000,
            undo_coalesce_ms: 300,
        }
    }
}

/// Auto-format engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFormatConfig {
    /// Master switch for prefix-based reclassification.
    pub enabled: bool,

    /// Extra rules appended after the built-in set. Each pattern is a
    /// regex matched against the block text from the start.
    pub extra_rules: Vec<CustomRule>,
}

impl Default for AutoFormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_rules: Vec::new(),
        }
    }
}

/// One user-supplied auto-format rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    /// Regex pattern, implicitly anchored at the start of the block.
    pub pattern: String,

    /// Target kind, kebab-case (`scene-heading`, `transition`, ...).
    pub target: screenwright_buffer::BlockType,
}

/// PDF export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Include the title page when exporting.
    pub title_page: bool,

    /// Author pre-filled on new title pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_author: Option<String>,

    /// Directory exported PDFs land in when no path is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title_page: true,
            default_author: None,
            output_dir: None,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the screenplay data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
