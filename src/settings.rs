//! Tool Settings
//!
//! Settings for the tool itself, separate from the per-project `gql-gen.json`. Sources in
//! increasing precedence: built-in defaults, the global settings file, the workspace
//! `graphgen.toml`, then `GRAPHGEN__SECTION__KEY` environment variables.

use crate::error::GenerateError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod merge_policy;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_SETTINGS_FILE;

pub const SETTINGS_ENV_PREFIX: &str = "GRAPHGEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub defaults: InvocationDefaults,
}

/// Remote schema retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("graphgen/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Fallbacks for invocation fields left at their defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationDefaults {
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    #[serde(default = "default_out")]
    pub out: String,
}

fn default_config_file() -> PathBuf {
    PathBuf::from(crate::project_config::DEFAULT_CONFIG_FILE)
}

fn default_out() -> String {
    ".".to_string()
}

impl Default for InvocationDefaults {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            out: default_out(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.http.timeout_secs == 0 {
            return Err(GenerateError::Settings(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.defaults.out.trim().is_empty() {
            return Err(GenerateError::Settings(
                "defaults.out cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings for a workspace from all sources, reading the process environment
    pub fn load(workspace_root: &Path) -> Result<Settings, GenerateError> {
        Self::load_with(workspace_root, global_config_path().as_deref(), None)
    }

    /// Load with an explicit global file and, optionally, an explicit environment
    pub fn load_with(
        workspace_root: &Path,
        global_path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Settings, GenerateError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder, global_path)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(SETTINGS_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a single settings file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Settings, GenerateError> {
        if !path.exists() {
            return Err(GenerateError::Settings(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        let settings: Settings = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults only
    pub fn defaults() -> Result<Settings, GenerateError> {
        let config: Config = merge_policy::builder_with_defaults()?.build()?;
        Ok(config.try_deserialize()?)
    }
}
