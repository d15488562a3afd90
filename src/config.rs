//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstree/rstree.toml`
//! 3. Local config: explicit file passed via `--config`
//! 4. Environment variables: `RSTREE_*` prefix
//!
//! Settings are only read by the binary. The builder receives an explicit
//! `TreeConfig` and never consults any process-wide configuration.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tree_config::{
    DEFAULT_CHILDREN_FIELD, DEFAULT_ID_FIELD, DEFAULT_NAME_FIELD, DEFAULT_PARENT_ID_FIELD,
    DEFAULT_WEIGHT_FIELD,
};
use crate::domain::{DomainError, TreeConfig};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("environment override: {0}")]
    Environment(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Output rendering of a built forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

/// Logical field names used by the JSON adapter and JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub weight: String,
    pub children: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_FIELD.into(),
            parent_id: DEFAULT_PARENT_ID_FIELD.into(),
            name: DEFAULT_NAME_FIELD.into(),
            weight: DEFAULT_WEIGHT_FIELD.into(),
            children: DEFAULT_CHILDREN_FIELD.into(),
        }
    }
}

/// Raw field names for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFieldNames {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub weight: Option<String>,
    pub children: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_depth: Option<i64>,
    pub format: Option<OutputFormat>,
    pub fields: RawFieldNames,
}

impl FieldNames {
    fn merge(&self, overlay: &RawFieldNames) -> Self {
        Self {
            id: overlay.id.clone().unwrap_or_else(|| self.id.clone()),
            parent_id: overlay
                .parent_id
                .clone()
                .unwrap_or_else(|| self.parent_id.clone()),
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            weight: overlay.weight.clone().unwrap_or_else(|| self.weight.clone()),
            children: overlay
                .children
                .clone()
                .unwrap_or_else(|| self.children.clone()),
        }
    }
}

/// Unified configuration for rstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Maximum nesting depth; unset means unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<i64>,
    /// Output format of `rstree build`
    pub format: OutputFormat,
    /// Field names of the input records
    pub fields: FieldNames,
}

/// Get the XDG config directory for rstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_depth: overlay.max_depth.or(self.max_depth),
            format: overlay.format.unwrap_or(self.format),
            fields: self.fields.merge(&overlay.fields),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_path` - Optional explicit config file; it must exist when given
    pub fn load(local_path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(local_path, default_environment())
    }

    /// Same as `load`, reading overrides from the given environment source.
    pub fn load_with_env(local_path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit local config
        if let Some(path) = local_path {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current.apply_env_overrides(env)
    }

    /// Apply RSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(|e| SettingsError::Environment(e.to_string()))?;

        if let Ok(val) = config.get_string("max_depth") {
            let depth = val.trim().parse::<i64>().map_err(|e| {
                SettingsError::Environment(format!("max_depth '{}': {}", val, e))
            })?;
            self.max_depth = Some(depth);
        }
        if let Ok(val) = config.get_string("format") {
            self.format = OutputFormat::from_str(&val, true)
                .map_err(|e| SettingsError::Environment(format!("format: {}", e)))?;
        }
        if let Ok(val) = config.get_string("fields.id") {
            self.fields.id = val;
        }
        if let Ok(val) = config.get_string("fields.parent_id") {
            self.fields.parent_id = val;
        }
        if let Ok(val) = config.get_string("fields.name") {
            self.fields.name = val;
        }
        if let Ok(val) = config.get_string("fields.weight") {
            self.fields.weight = val;
        }
        if let Ok(val) = config.get_string("fields.children") {
            self.fields.children = val;
        }

        Ok(self)
    }

    /// Validated tree configuration; a negative depth is rejected here.
    pub fn tree_config(&self) -> Result<TreeConfig, SettingsError> {
        let config = TreeConfig::builder()
            .id_field(&self.fields.id)
            .parent_id_field(&self.fields.parent_id)
            .name_field(&self.fields.name)
            .weight_field(&self.fields.weight)
            .children_field(&self.fields.children)
            .max_depth_opt(self.max_depth)
            .build()?;
        Ok(config)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            path: PathBuf::from("<settings>"),
            message: e.to_string(),
        })
    }
}

fn default_environment() -> Environment {
    Environment::with_prefix("RSTREE")
        .prefix_separator("_")
        .separator("__")
}
