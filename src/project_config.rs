//! Persisted project config (`gql-gen.json`)

use crate::error::GenerateError;
use crate::types::{ConfigMap, PrimitiveOverrides};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "gql-gen.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten_types: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitives: Option<PrimitiveOverrides>,

    /// Helper name to module file path
    #[serde(default)]
    pub custom_helpers: BTreeMap<String, PathBuf>,

    /// Lowest-precedence emitter options
    #[serde(default)]
    pub generator_config: ConfigMap,
}

/// Read the project config if present; a missing file is not an error
pub fn load_project_config(path: &Path) -> Result<Option<ProjectConfigFile>, GenerateError> {
    if !path.exists() {
        debug!(path = %path.display(), "No project config file");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| GenerateError::ProjectConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let config = serde_json::from_str(&text).map_err(|e| GenerateError::ProjectConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "Loaded project config");
    Ok(Some(config))
}
