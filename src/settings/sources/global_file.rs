//! Global settings file: `graphgen/config.toml` under the platform config directory.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global settings file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "graphgen").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global settings file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path {
        Some(path) if path.exists() => {
            let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            debug!(config_path = %canonical.display(), "Using global settings file");
            Ok(builder.add_source(File::from(canonical).required(false)))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global settings file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}
