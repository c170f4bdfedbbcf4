//! Discovery of custom template files in a project directory

use crate::types::TemplateFile;
use std::path::Path;
use walkdir::WalkDir;

/// File extensions recognised as custom templates
pub const CUSTOM_TEMPLATE_EXTENSIONS: [&str; 4] = ["template", "handlebars", "tmpl", "hbs"];

pub trait TemplateScanner: Send + Sync {
    fn scan(&self, root: &Path, extensions: &[&str]) -> std::io::Result<Vec<TemplateFile>>;
}

/// Recursive directory scan; results sorted by path for determinism
#[derive(Debug, Clone)]
pub struct WalkdirScanner {
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
}

impl Default for WalkdirScanner {
    fn default() -> Self {
        Self {
            skip_dirs: vec![".git".to_string(), "node_modules".to_string()],
        }
    }
}

impl TemplateScanner for WalkdirScanner {
    fn scan(&self, root: &Path, extensions: &[&str]) -> std::io::Result<Vec<TemplateFile>> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && entry.depth() > 0
                    && self
                        .skip_dirs
                        .iter()
                        .any(|skip| entry.file_name().to_str() == Some(skip.as_str())))
            });

        let mut templates = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk directory: {}", e),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| extensions.contains(&ext))
                .unwrap_or(false);
            if matches {
                let content = std::fs::read_to_string(entry.path())?;
                templates.push(TemplateFile {
                    path: entry.path().to_path_buf(),
                    content,
                });
            }
        }
        Ok(templates)
    }
}
