//! Template Resolution
//!
//! Maps a template specifier to a generator config or a custom processing function.
//! Legacy aliases are applied first; then a path that exists relative to the working
//! directory is loaded as a local module, and anything else is looked up as an installed
//! package. The loaded module's effective export must be a generator config or a
//! processor.

use crate::error::{GenerateError, INSTALL_INSTRUCTIONS};
use crate::types::{CustomProcessor, GeneratorConfig};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub mod alias;
pub mod manifest;
pub mod module;
pub mod project;
pub mod registry;
pub mod scan;

pub use alias::{resolve_alias, MULTI_FILE_PACKAGE, SINGLE_FILE_PACKAGE};
pub use module::{LoadedModule, ModuleExport};
pub use project::resolve_project;
pub use registry::{ModuleLoader, TemplateRegistry};
pub use scan::{TemplateScanner, WalkdirScanner, CUSTOM_TEMPLATE_EXTENSIONS};

/// What a template specifier resolves to
#[derive(Clone)]
pub enum ResolvedTemplate {
    Config(GeneratorConfig),
    Processor(Arc<dyn CustomProcessor>),
}

impl ResolvedTemplate {
    pub fn generator_config(&self) -> Option<&GeneratorConfig> {
        match self {
            ResolvedTemplate::Config(config) => Some(config),
            ResolvedTemplate::Processor(_) => None,
        }
    }

    pub fn processor(&self) -> Option<&Arc<dyn CustomProcessor>> {
        match self {
            ResolvedTemplate::Processor(processor) => Some(processor),
            ResolvedTemplate::Config(_) => None,
        }
    }
}

impl fmt::Debug for ResolvedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedTemplate::Config(config) => f.debug_tuple("Config").field(config).finish(),
            ResolvedTemplate::Processor(_) => f.write_str("Processor(..)"),
        }
    }
}

/// Where a specifier was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    LocalPath(std::path::PathBuf),
    Package(String),
}

/// Decide between local path and package, after alias expansion
pub fn plan_lookup(specifier: &str, working_dir: &Path) -> Lookup {
    let name = resolve_alias(specifier);
    let local = working_dir.join(name);
    if local.exists() {
        Lookup::LocalPath(local)
    } else {
        Lookup::Package(name.to_string())
    }
}

pub struct TemplateResolver<'a> {
    loader: &'a dyn ModuleLoader,
    working_dir: &'a Path,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(loader: &'a dyn ModuleLoader, working_dir: &'a Path) -> Self {
        Self {
            loader,
            working_dir,
        }
    }

    pub fn resolve(&self, specifier: &str) -> Result<ResolvedTemplate, GenerateError> {
        let not_found = || GenerateError::TemplateResolution {
            specifier: specifier.to_string(),
            instructions: INSTALL_INSTRUCTIONS.to_string(),
        };

        let lookup = plan_lookup(specifier, self.working_dir);
        debug!(specifier, lookup = ?lookup, "Resolving template");
        let loaded = match &lookup {
            Lookup::LocalPath(path) => self.loader.load_path(path),
            Lookup::Package(name) => self.loader.load_package(name),
        }
        .map_err(|e| GenerateError::TemplateResolution {
            specifier: specifier.to_string(),
            instructions: format!("{}\n{}", e, INSTALL_INSTRUCTIONS),
        })?
        .ok_or_else(not_found)?;

        match loaded.effective() {
            Some(ModuleExport::Generator(config)) => {
                Ok(ResolvedTemplate::Config(config.as_ref().clone()))
            }
            Some(ModuleExport::Processor(processor)) => {
                Ok(ResolvedTemplate::Processor(Arc::clone(processor)))
            }
            Some(other) => Err(GenerateError::TemplateShape {
                specifier: specifier.to_string(),
                found: other.kind().to_string(),
            }),
            None => Err(not_found()),
        }
    }
}
