//! Config Layering
//!
//! Combines the project config, the caller's overrides and environment overrides into the
//! effective emitter options, and applies the project-level `flattenTypes` / `primitives`
//! overrides on top of the template defaults.

use crate::error::EngineError;
use crate::project_config::ProjectConfigFile;
use crate::schema::engine::SchemaEngine;
use crate::types::{ConfigMap, GeneratorConfig};
use serde_json::Value;
use tracing::{debug, warn};

pub mod env;

pub use env::{env_key, env_overrides, env_value, ENV_PREFIX};

/// Shallow union of layers, later layers win on key conflicts
pub fn merge_layers<'a, I>(layers: I) -> ConfigMap
where
    I: IntoIterator<Item = &'a ConfigMap>,
{
    layers.into_iter().fold(ConfigMap::new(), |mut merged, layer| {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
        merged
    })
}

/// The three config sources, lowest precedence first
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    pub project: ConfigMap,
    pub caller: ConfigMap,
    pub environment: ConfigMap,
}

impl ConfigLayers {
    pub fn new(
        project: Option<&ProjectConfigFile>,
        caller: ConfigMap,
        environment: ConfigMap,
    ) -> Self {
        Self {
            project: project
                .map(|p| p.generator_config.clone())
                .unwrap_or_default(),
            caller,
            environment,
        }
    }

    pub fn merged(&self) -> ConfigMap {
        merge_layers([&self.project, &self.caller, &self.environment])
    }
}

/// Produce the effective generator config for a run.
///
/// The template's own `config` map sits beneath the three layers.
pub fn layer_generator_config(
    base: GeneratorConfig,
    project: Option<&ProjectConfigFile>,
    layers: &ConfigLayers,
) -> GeneratorConfig {
    if let Some(note) = &base.deprecation_note {
        warn!(note = %note, "Template is deprecated");
    }

    let mut config = base;
    config.config = merge_layers([&config.config, &layers.merged()]);

    if let Some(project) = project {
        if let Some(flatten_types) = project.flatten_types {
            config.flatten_types = flatten_types;
        }
        if let Some(primitives) = &project.primitives {
            config.primitives = primitives.apply_to(config.primitives);
        }
    }

    debug!(
        keys = config.config.len(),
        flatten_types = config.flatten_types,
        "Layered generator config"
    );
    config
}

/// Normalize `addToSchema` to a list and parse string members
pub fn normalize_extensions<E: SchemaEngine>(
    engine: &E,
    add_to_schema: Option<&Value>,
) -> Result<Vec<E::Extension>, EngineError> {
    let items: Vec<&Value> = match add_to_schema {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(sdl) => engine.parse_extension(sdl),
            other => engine.adopt_extension(other),
        })
        .collect()
}
