//! Configuration for refdup
//!
//! Settings are read from TOML. Sources are resolved in order: built-in
//! defaults, the user file (`~/.refdup/config.toml`), then the project file
//! (`.refdup.toml`). A later file replaces the earlier configuration as a
//! whole; keys missing from it take their default values.
//!
//! ```toml
//! [detector]
//! warn_on_skipped = true
//!
//! [report]
//! format = "json"
//! fail_on_duplicates = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the project-level config file
pub const PROJECT_CONFIG_FILE: &str = ".refdup.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefdupConfig {
    pub detector: DetectorConfig,
    pub report: ReportConfig,
}

/// Detector settings
///
/// These only affect logging. The matching policy (exact key equality) is
/// not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Log a warning for every segment the parser skipped
    pub warn_on_skipped: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            warn_on_skipped: true,
        }
    }
}

/// Output format for duplicate reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Keys,
    Bibtex,
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Exit non-zero when duplicates are found
    pub fail_on_duplicates: bool,
}

impl RefdupConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Path of the user config file, if a home directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".refdup").join("config.toml"))
    }

    /// Load config from the standard locations
    ///
    /// Loads in order: defaults, user (`~/.refdup/config.toml`), project
    /// (`<project_root>/.refdup.toml`). Missing files are skipped.
    pub fn load_standard(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        let project_path = project_root.map(|root| root.join(PROJECT_CONFIG_FILE));
        Self::load_layered(
            Self::user_config_path().as_deref(),
            project_path.as_deref(),
        )
    }

    fn load_layered(user: Option<&Path>, project: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in [user, project].into_iter().flatten() {
            if path.exists() {
                tracing::debug!("Loading config from {:?}", path);
                config = Self::load_from_file(path)?;
            }
        }

        Ok(config)
    }
}
