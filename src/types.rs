//! Core data model shared by the pipeline stages.

use crate::error::BoxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Arbitrary emitter options map
pub type ConfigMap = Map<String, Value>;

/// How a template consumes its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    SingleFile,
    Project,
}

/// Target representation names for the five built-in scalars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitives {
    #[serde(rename = "String")]
    pub string: String,
    #[serde(rename = "Int")]
    pub int: String,
    #[serde(rename = "Float")]
    pub float: String,
    #[serde(rename = "Boolean")]
    pub boolean: String,
    #[serde(rename = "ID")]
    pub id: String,
}

impl Default for Primitives {
    fn default() -> Self {
        Self {
            string: "string".to_string(),
            int: "number".to_string(),
            float: "number".to_string(),
            boolean: "boolean".to_string(),
            id: "string".to_string(),
        }
    }
}

/// Partial scalar mapping; only declared scalars override a template default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveOverrides {
    #[serde(rename = "String", default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(rename = "Int", default, skip_serializing_if = "Option::is_none")]
    pub int: Option<String>,
    #[serde(rename = "Float", default, skip_serializing_if = "Option::is_none")]
    pub float: Option<String>,
    #[serde(rename = "Boolean", default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<String>,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PrimitiveOverrides {
    /// Overwrite each declared scalar, leaving the others untouched
    pub fn apply_to(&self, primitives: Primitives) -> Primitives {
        Primitives {
            string: self.string.clone().unwrap_or(primitives.string),
            int: self.int.clone().unwrap_or(primitives.int),
            float: self.float.clone().unwrap_or(primitives.float),
            boolean: self.boolean.clone().unwrap_or(primitives.boolean),
            id: self.id.clone().unwrap_or(primitives.id),
        }
    }
}

/// A discovered custom template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    pub path: PathBuf,
    pub content: String,
}

/// A callable exposed to templates
pub trait TemplateHelper: Send + Sync {
    fn call(&self, args: &[Value]) -> Value;
}

impl<F> TemplateHelper for F
where
    F: Fn(&[Value]) -> Value + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Value {
        self(args)
    }
}

/// Resolved, layered options controlling one emitter run
#[derive(Clone)]
pub struct GeneratorConfig {
    pub input_type: InputType,
    pub templates: Vec<TemplateFile>,
    pub flatten_types: bool,
    pub primitives: Primitives,
    pub custom_helpers: BTreeMap<String, Arc<dyn TemplateHelper>>,
    pub config: ConfigMap,
    /// Extension sources: a bare value or a list, strings are SDL
    pub add_to_schema: Option<Value>,
    pub deprecation_note: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input_type: InputType::SingleFile,
            templates: Vec::new(),
            flatten_types: false,
            primitives: Primitives::default(),
            custom_helpers: BTreeMap::new(),
            config: ConfigMap::new(),
            add_to_schema: None,
            deprecation_note: None,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("input_type", &self.input_type)
            .field("templates", &self.templates)
            .field("flatten_types", &self.flatten_types)
            .field("primitives", &self.primitives)
            .field(
                "custom_helpers",
                &self.custom_helpers.keys().collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .field("add_to_schema", &self.add_to_schema)
            .field("deprecation_note", &self.deprecation_note)
            .finish()
    }
}

/// One generated file as produced by an emitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutput {
    pub filename: PathBuf,
    pub content: String,
}

impl FileOutput {
    pub fn new(filename: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Which halves of the output an emitter should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitFlags {
    pub generate_schema: bool,
    pub generate_documents: bool,
}

/// A named entry in a schema context or document collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedItem {
    pub name: String,
    pub description: Option<String>,
    /// Fields, enum values, union members or selections, depending on the collection
    pub members: Vec<String>,
}

impl NamedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Schema-derived collections handed to templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaContext {
    pub types: Vec<NamedItem>,
    pub inputs: Vec<NamedItem>,
    pub interfaces: Vec<NamedItem>,
    pub unions: Vec<NamedItem>,
    pub enums: Vec<NamedItem>,
    pub scalars: Vec<NamedItem>,
    pub directives: Vec<NamedItem>,
}

/// Transformed operation documents handed to templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCollection {
    pub operations: Vec<NamedItem>,
    pub fragments: Vec<NamedItem>,
}

impl DocumentCollection {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.fragments.is_empty()
    }
}

/// A template implemented as a single processing function
#[async_trait]
pub trait CustomProcessor: Send + Sync {
    async fn process(
        &self,
        context: &SchemaContext,
        documents: &[DocumentCollection],
        flags: EmitFlags,
    ) -> Result<Vec<FileOutput>, BoxError>;
}
