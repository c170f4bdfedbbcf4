//! Module loading seam and the in-process module registry.

use crate::error::BoxError;
use crate::template::manifest;
use crate::template::module::LoadedModule;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads template and helper modules by file path or package name.
///
/// `Ok(None)` means the module exists but yielded nothing usable.
pub trait ModuleLoader: Send + Sync {
    fn load_path(&self, path: &Path) -> Result<Option<LoadedModule>, BoxError>;

    fn load_package(&self, name: &str) -> Result<Option<LoadedModule>, BoxError>;
}

/// Registry of installed packages and path-bound modules.
///
/// Paths that are not registered fall back to manifest parsing.
#[derive(Default)]
pub struct TemplateRegistry {
    packages: RwLock<HashMap<String, LoadedModule>>,
    paths: RwLock<HashMap<PathBuf, LoadedModule>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a module under a package name
    pub fn register_package(&self, name: impl Into<String>, module: LoadedModule) {
        let name = name.into();
        debug!(package = %name, "Registered template package");
        self.packages.write().insert(name, module);
    }

    /// Bind a module to a file path (e.g. a custom helper file)
    pub fn register_path(&self, path: impl AsRef<Path>, module: LoadedModule) {
        let key = registry_key(path.as_ref());
        debug!(path = %key.display(), "Registered module path");
        self.paths.write().insert(key, module);
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.packages.read().contains_key(name)
    }

    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.packages.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn registry_key(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl ModuleLoader for TemplateRegistry {
    fn load_path(&self, path: &Path) -> Result<Option<LoadedModule>, BoxError> {
        if let Some(module) = self.paths.read().get(&registry_key(path)) {
            return Ok(Some(module.clone()));
        }
        if path.is_file() && manifest::is_manifest(path) {
            return manifest::load_manifest(path).map(Some);
        }
        Ok(None)
    }

    fn load_package(&self, name: &str) -> Result<Option<LoadedModule>, BoxError> {
        Ok(self.packages.read().get(name).cloned())
    }
}
