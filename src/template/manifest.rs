//! Local template manifests (`.json` / `.toml`).
//!
//! A manifest describes a generator config. It holds the config under a top-level
//! `default` key, under a top-level `config` key whose value is itself generator-shaped,
//! or is the config itself.

use crate::error::BoxError;
use crate::template::module::{LoadedModule, ModuleExport};
use crate::types::{
    ConfigMap, GeneratorConfig, InputType, PrimitiveOverrides, Primitives, TemplateFile,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Keys that mark an object as a generator config
const GENERATOR_KEYS: [&str; 7] = [
    "inputType",
    "templates",
    "flattenTypes",
    "primitives",
    "config",
    "addToSchema",
    "deprecationNote",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GeneratorManifest {
    input_type: Option<InputType>,
    #[serde(default)]
    templates: Vec<PathBuf>,
    #[serde(default)]
    flatten_types: bool,
    #[serde(default)]
    primitives: PrimitiveOverrides,
    #[serde(default)]
    config: ConfigMap,
    add_to_schema: Option<Value>,
    deprecation_note: Option<String>,
}

pub fn is_manifest(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("toml")
    )
}

/// Read a manifest file into module exports
pub fn load_manifest(path: &Path) -> Result<LoadedModule, BoxError> {
    let text = std::fs::read_to_string(path)?;
    let mut value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            let table: toml::Value = toml::from_str(&text)?;
            serde_json::to_value(table)?
        }
        _ => serde_json::from_str(&text)?,
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut module = LoadedModule::default();
    if let Value::Object(map) = &mut value {
        if let Some(default) = map.remove("default") {
            module.default = Some(export_from(default, base_dir)?);
        }
        // a plain `config` map is emitter options, not an export
        if map.get("config").is_some_and(looks_like_generator) {
            if let Some(config) = map.remove("config") {
                module.config = Some(export_from(config, base_dir)?);
            }
        }
    }
    module.value = Some(export_from(value, base_dir)?);
    Ok(module)
}

fn looks_like_generator(value: &Value) -> bool {
    value
        .as_object()
        .map(|map| GENERATOR_KEYS.iter().any(|key| map.contains_key(*key)))
        .unwrap_or(false)
}

fn export_from(value: Value, base_dir: &Path) -> Result<ModuleExport, BoxError> {
    if !looks_like_generator(&value) {
        return Ok(ModuleExport::Data(value));
    }
    let manifest: GeneratorManifest = serde_json::from_value(value)?;

    let mut templates = Vec::with_capacity(manifest.templates.len());
    for relative in manifest.templates {
        let path = base_dir.join(&relative);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("template file {}: {}", path.display(), e))?;
        templates.push(TemplateFile { path, content });
    }

    Ok(ModuleExport::Generator(Box::new(GeneratorConfig {
        input_type: manifest.input_type.unwrap_or(InputType::SingleFile),
        templates,
        flatten_types: manifest.flatten_types,
        primitives: manifest.primitives.apply_to(Primitives::default()),
        custom_helpers: Default::default(),
        config: manifest.config,
        add_to_schema: manifest.add_to_schema,
        deprecation_note: manifest.deprecation_note,
    })))
}
