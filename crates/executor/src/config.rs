//! Console configuration via `docadmin.toml`
//!
//! The console reads a small TOML file next to its data. A default file is
//! written on first start; edit it and restart to change settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use docadmin_core::ejson::Mode;

use crate::bridge::validate_database;
use crate::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docadmin.toml";

/// Repair settings, the `[repair]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RepairConfig {
    /// Journal file for interrupted repairs; kept in memory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
}

/// Console configuration loaded from `docadmin.toml`.
///
/// # Example
///
/// ```toml
/// default_database = "mongoadmin"
/// page_size = 25
/// output = "relaxed"
///
/// [repair]
/// journal_path = "repair.jsonl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Database used when a command names none
    #[serde(default = "default_database")]
    pub default_database: String,
    /// Documents per page when listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Extended JSON flavour for rendered documents: `"relaxed"` or `"canonical"`
    #[serde(default = "default_output")]
    pub output: String,
    /// Repair settings
    #[serde(default)]
    pub repair: RepairConfig,
}

fn default_database() -> String {
    "mongoadmin".to_string()
}

fn default_page_size() -> usize {
    25
}

fn default_output() -> String {
    "relaxed".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_database: default_database(),
            page_size: default_page_size(),
            output: default_output(),
            repair: RepairConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Parse the output string into an extended JSON [`Mode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"relaxed"` or `"canonical"`.
    pub fn output_mode(&self) -> Result<Mode> {
        match self.output.as_str() {
            "relaxed" => Ok(Mode::Relaxed),
            "canonical" => Ok(Mode::Canonical),
            other => Err(Error::InvalidInput {
                reason: format!(
                    "Invalid output mode '{}' in {}. Expected \"relaxed\" or \"canonical\".",
                    other, CONFIG_FILE_NAME
                ),
            }),
        }
    }

    /// Check every setting that serde alone cannot.
    pub fn validate(&self) -> Result<()> {
        self.output_mode()?;
        if self.page_size == 0 {
            return Err(Error::InvalidInput {
                reason: format!("page_size in {} must be greater than 0", CONFIG_FILE_NAME),
            });
        }
        if self.default_database.is_empty() {
            return Err(Error::InvalidInput {
                reason: format!("default_database in {} must not be empty", CONFIG_FILE_NAME),
            });
        }
        validate_database(&self.default_database).map_err(|e| Error::InvalidInput {
            reason: format!("default_database in {}: {}", CONFIG_FILE_NAME, e),
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docadmin console configuration
#
# Database used when a request names none
default_database = "mongoadmin"

# Documents per page when listing a collection
page_size = 25

# Extended JSON flavour for documents sent to the browser
#   "relaxed"   = plain JSON numbers and ISO dates where lossless
#   "canonical" = every typed value wrapped, e.g. {"$numberLong": "1"}
output = "relaxed"

# Identifier repair. Without a journal file, an interrupted repair can only
# be recovered while the process is still running.
# [repair]
# journal_path = "repair.jsonl"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Internal {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: ConsoleConfig = toml::from_str(&content).map_err(|e| Error::InvalidInput {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Internal {
                reason: format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Internal {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Internal {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }
}
