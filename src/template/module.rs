//! Loaded template and helper modules and their exports.

use crate::types::{CustomProcessor, GeneratorConfig, TemplateHelper};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A single exported value of a module
#[derive(Clone)]
pub enum ModuleExport {
    Generator(Box<GeneratorConfig>),
    Processor(Arc<dyn CustomProcessor>),
    Helper(Arc<dyn TemplateHelper>),
    /// Plain data with no callable or generator shape
    Data(Value),
}

impl ModuleExport {
    /// Null, false, zero and empty strings count as "nothing exported"
    pub fn is_truthy(&self) -> bool {
        match self {
            ModuleExport::Data(Value::Null) | ModuleExport::Data(Value::Bool(false)) => false,
            ModuleExport::Data(Value::String(s)) => !s.is_empty(),
            ModuleExport::Data(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
            _ => true,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModuleExport::Generator(_) => "generator config",
            ModuleExport::Processor(_) => "processing function",
            ModuleExport::Helper(_) => "helper function",
            ModuleExport::Data(Value::Object(_)) => "object",
            ModuleExport::Data(Value::Array(_)) => "array",
            ModuleExport::Data(_) => "scalar value",
        }
    }
}

impl fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleExport::Generator(config) => f.debug_tuple("Generator").field(config).finish(),
            ModuleExport::Processor(_) => f.write_str("Processor(..)"),
            ModuleExport::Helper(_) => f.write_str("Helper(..)"),
            ModuleExport::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

/// The exports of a loaded module.
///
/// `default` wins over `config`, which wins over the module's own value.
#[derive(Debug, Clone, Default)]
pub struct LoadedModule {
    pub default: Option<ModuleExport>,
    pub config: Option<ModuleExport>,
    pub value: Option<ModuleExport>,
}

impl LoadedModule {
    pub fn with_default(export: ModuleExport) -> Self {
        Self {
            default: Some(export),
            ..Default::default()
        }
    }

    pub fn from_value(export: ModuleExport) -> Self {
        Self {
            value: Some(export),
            ..Default::default()
        }
    }

    pub fn generator(config: GeneratorConfig) -> Self {
        Self::with_default(ModuleExport::Generator(Box::new(config)))
    }

    pub fn processor(processor: Arc<dyn CustomProcessor>) -> Self {
        Self::with_default(ModuleExport::Processor(processor))
    }

    pub fn helper(helper: Arc<dyn TemplateHelper>) -> Self {
        Self::with_default(ModuleExport::Helper(helper))
    }

    /// The export a consumer should use, skipping empty ones
    pub fn effective(&self) -> Option<&ModuleExport> {
        [&self.default, &self.config, &self.value]
            .into_iter()
            .flatten()
            .find(|export| export.is_truthy())
    }
}
