//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "databaseFile": "bankline.duckdb" },
//!   "passwordHashing": { "timeCost": 2, "memoryCost": 19456, "parallelism": 1, "hashLen": 32 }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Argon2Params;

/// Name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Default ledger database file name
pub const DEFAULT_DATABASE_FILE: &str = "bankline.duckdb";

/// Environment variable overriding `app.databaseFile`
pub const DATABASE_FILE_ENV: &str = "BANKLINE_DATABASE_FILE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    password_hashing: Option<Argon2Params>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_file: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bankline configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_file: String,
    pub password_hashing: Argon2Params,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            password_hashing: Argon2Params::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing settings file yields the defaults. The database file can be
    /// overridden with the BANKLINE_DATABASE_FILE environment variable.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_override(data_dir, std::env::var(DATABASE_FILE_ENV).ok())
    }

    fn load_with_override(data_dir: &Path, database_file: Option<String>) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILE))?;

        let database_file = database_file
            .filter(|f| !f.trim().is_empty())
            .or(raw.app.database_file)
            .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());

        Ok(Self {
            database_file,
            password_hashing: raw.password_hashing.unwrap_or_default(),
        })
    }

    /// Save config to the data directory, preserving settings we don't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        let mut settings = read_settings(&settings_path)?;

        settings.app.database_file = Some(self.database_file.clone());
        settings.password_hashing = Some(self.password_hashing.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Absolute path of the ledger database
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
}
