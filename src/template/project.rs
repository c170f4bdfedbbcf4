//! Project mode: a generator config assembled from a project directory.

use crate::error::GenerateError;
use crate::project_config::ProjectConfigFile;
use crate::template::module::ModuleExport;
use crate::template::registry::ModuleLoader;
use crate::template::scan::{TemplateScanner, CUSTOM_TEMPLATE_EXTENSIONS};
use crate::types::{GeneratorConfig, InputType, Primitives, TemplateHelper};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the project-mode generator config.
///
/// Requires a loaded project config; `config_path` is only used for the error message.
pub fn resolve_project(
    loader: &dyn ModuleLoader,
    scanner: &dyn TemplateScanner,
    working_dir: &Path,
    project_dir: &Path,
    project_config: Option<&ProjectConfigFile>,
    config_path: &Path,
) -> Result<GeneratorConfig, GenerateError> {
    let project_config = project_config.ok_or_else(|| GenerateError::ProjectConfigMissing {
        path: config_path.to_path_buf(),
    })?;

    let root = working_dir.join(project_dir);
    let templates = scanner
        .scan(&root, &CUSTOM_TEMPLATE_EXTENSIONS)
        .map_err(|e| GenerateError::TemplateScan {
            path: root.clone(),
            message: e.to_string(),
        })?;
    info!(
        project = %root.display(),
        templates = templates.len(),
        "Loaded custom templates"
    );

    let custom_helpers = resolve_helpers(loader, working_dir, &project_config.custom_helpers)?;

    Ok(GeneratorConfig {
        input_type: InputType::Project,
        templates,
        flatten_types: true,
        primitives: Primitives::default(),
        custom_helpers,
        ..Default::default()
    })
}

/// Load each declared helper file; missing or non-callable helpers are fatal
pub fn resolve_helpers(
    loader: &dyn ModuleLoader,
    working_dir: &Path,
    declared: &BTreeMap<String, std::path::PathBuf>,
) -> Result<BTreeMap<String, Arc<dyn TemplateHelper>>, GenerateError> {
    let mut helpers = BTreeMap::new();
    for (name, file) in declared {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            working_dir.join(file)
        };
        let helper_error = |reason: String| GenerateError::CustomHelper {
            name: name.clone(),
            path: path.clone(),
            reason,
        };

        if !path.exists() {
            return Err(helper_error("does not exist".to_string()));
        }
        let module = loader
            .load_path(&path)
            .map_err(|e| helper_error(format!("failed to load: {}", e)))?;
        match module.as_ref().and_then(|m| m.effective()) {
            Some(ModuleExport::Helper(helper)) => {
                debug!(helper = %name, path = %path.display(), "Loaded custom helper");
                helpers.insert(name.clone(), Arc::clone(helper));
            }
            Some(other) => {
                return Err(helper_error(format!(
                    "does not export a function (found {})",
                    other.kind()
                )))
            }
            None => return Err(helper_error("does not export a function".to_string())),
        }
    }
    Ok(helpers)
}
