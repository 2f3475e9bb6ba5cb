//! Configuration management for chunkfold
//!
//! Loads the TOML configuration, applies environment overrides and named
//! profiles, and validates the result before anything runs with it.

use crate::error::{ChunkfoldError, Result};
use crate::retrieval::{FingerprintAlgorithm, MissingFieldPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Exact-duplicate elimination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    pub enabled: bool,
    #[serde(default)]
    pub algorithm: FingerprintAlgorithm,
    #[serde(default)]
    pub on_missing_field: MissingFieldPolicy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: FingerprintAlgorithm::Sha256,
            on_missing_field: MissingFieldPolicy::Error,
        }
    }
}

/// Overlap merging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub enabled: bool,
    /// Dotted path of the grouping key; empty disables merging
    #[serde(default)]
    pub source_field: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_field: "metadata.document_id".to_string(),
        }
    }
}

/// Display settings for the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub preview_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { preview_chars: 120 }
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<FingerprintAlgorithm>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChunkfoldError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ChunkfoldError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ChunkfoldError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| ChunkfoldError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(enabled) = overrides.dedup_enabled {
            self.dedup.enabled = enabled;
        }
        if let Some(enabled) = overrides.merge_enabled {
            self.merge.enabled = enabled;
        }
        if let Some(field) = overrides.source_field {
            self.merge.source_field = field;
        }
        if let Some(algorithm) = overrides.algorithm {
            self.dedup.algorithm = algorithm;
        }

        tracing::debug!("Applied profile '{}'", profile);
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: CHUNKFOLD_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("CHUNKFOLD_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "DEDUP__ENABLED" => {
                self.dedup.enabled = parse_bool(path, value)?;
            }
            "DEDUP__ALGORITHM" => {
                self.dedup.algorithm = value.parse()?;
            }
            "MERGE__ENABLED" => {
                self.merge.enabled = parse_bool(path, value)?;
            }
            "MERGE__SOURCE_FIELD" => {
                self.merge.source_field = value.to_string();
            }
            "OUTPUT__PREVIEW_CHARS" => {
                self.output.preview_chars =
                    value
                        .parse()
                        .map_err(|_| ChunkfoldError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!("Cannot parse '{}' as a number", value),
                        })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ChunkfoldError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("chunkfold").join("config.toml"))
    }
}

fn parse_bool(path: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| ChunkfoldError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}' as boolean", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "raw".to_string(),
            ProfileOverrides {
                dedup_enabled: Some(false),
                merge_enabled: Some(false),
                ..Default::default()
            },
        );

        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            dedup: DedupConfig::default(),
            merge: MergeConfig::default(),
            output: OutputConfig::default(),
            profiles,
        }
    }
}
