//! Writing normalized outputs to disk.

use crate::error::GenerateError;
use crate::types::FileOutput;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    /// Existing files left untouched because overwriting was not requested
    pub skipped: Vec<PathBuf>,
}

/// Write each file; existing files are only replaced when `overwrite` is set.
///
/// Several outputs collapsing onto one path are written in order, so the last one wins.
pub fn write_outputs(
    files: &[FileOutput],
    overwrite: bool,
) -> Result<WriteSummary, GenerateError> {
    let mut summary = WriteSummary::default();
    for file in files {
        let already_written = summary.written.contains(&file.filename);
        if file.filename.exists() && !overwrite && !already_written {
            warn!(path = %file.filename.display(), "Skipping existing file (overwrite disabled)");
            summary.skipped.push(file.filename.clone());
            continue;
        }
        std::fs::write(&file.filename, &file.content).map_err(|e| GenerateError::OutputWrite {
            path: file.filename.clone(),
            message: e.to_string(),
        })?;
        info!(path = %file.filename.display(), bytes = file.content.len(), "Generated file");
        if !already_written {
            summary.written.push(file.filename.clone());
        }
    }
    Ok(summary)
}
