//! Operation document loading and validation against the canonical schema.

use crate::error::GenerateError;
use crate::schema::engine::SchemaEngine;
use crate::schema::source::expand_glob;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw document text as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    pub path: PathBuf,
    pub text: String,
}

/// A parsed operation document and the file it came from
#[derive(Debug, Clone)]
pub struct DocumentFile<D> {
    pub path: PathBuf,
    pub content: D,
}

/// Validation messages for one failing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentValidationError {
    pub file_path: PathBuf,
    pub errors: Vec<String>,
}

/// Aggregate of all failing files in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentValidationReport {
    pub entries: Vec<DocumentValidationError>,
}

impl DocumentValidationReport {
    pub fn new(entries: Vec<DocumentValidationError>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_errors(&self) -> usize {
        self.entries.iter().map(|e| e.errors.len()).sum()
    }
}

impl fmt::Display for DocumentValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} errors in {} documents",
            self.total_errors(),
            self.entries.len()
        )?;
        for entry in &self.entries {
            write!(f, "\n  {}:", entry.file_path.display())?;
            for message in &entry.errors {
                write!(f, "\n    {}", message)?;
            }
        }
        Ok(())
    }
}

/// Expands document path/glob arguments into document texts
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load(
        &self,
        patterns: &[String],
        base_dir: &Path,
    ) -> Result<Vec<DocumentText>, GenerateError>;
}

/// Reads every file matching the given globs, in sorted path order
#[derive(Debug, Clone, Default)]
pub struct GlobDocumentSource;

#[async_trait]
impl DocumentSource for GlobDocumentSource {
    async fn load(
        &self,
        patterns: &[String],
        base_dir: &Path,
    ) -> Result<Vec<DocumentText>, GenerateError> {
        let mut paths = BTreeSet::new();
        for pattern in patterns {
            let matches = expand_glob(pattern, base_dir).map_err(|e| {
                GenerateError::DocumentLoad {
                    path: PathBuf::from(pattern),
                    message: e.to_string(),
                }
            })?;
            paths.extend(matches);
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                GenerateError::DocumentLoad {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;
            documents.push(DocumentText { path, text });
        }
        debug!(count = documents.len(), "Loaded operation documents");
        Ok(documents)
    }
}

pub fn parse_documents<E: SchemaEngine>(
    engine: &E,
    texts: Vec<DocumentText>,
) -> Result<Vec<DocumentFile<E::Document>>, GenerateError> {
    texts
        .into_iter()
        .map(|doc| {
            let content = engine.parse_document(&doc.path, &doc.text).map_err(|e| {
                GenerateError::DocumentLoad {
                    path: doc.path.clone(),
                    message: e.to_string(),
                }
            })?;
            Ok(DocumentFile {
                path: doc.path,
                content,
            })
        })
        .collect()
}

/// Validate each document; files without errors are left out of the result
pub fn validate_documents<E: SchemaEngine>(
    engine: &E,
    schema: &E::Schema,
    documents: &[DocumentFile<E::Document>],
) -> Vec<DocumentValidationError> {
    documents
        .iter()
        .filter_map(|doc| {
            let errors = engine.validate(schema, &doc.content);
            (!errors.is_empty()).then(|| DocumentValidationError {
                file_path: doc.path.clone(),
                errors,
            })
        })
        .collect()
}
