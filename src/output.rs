//! Output path normalization against the caller's `out` target.

use crate::error::GenerateError;
use crate::types::FileOutput;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use tracing::debug;

/// Resolve `.` and `..` without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

fn ends_with_separator(out: &str) -> bool {
    out.ends_with('/') || out.ends_with(MAIN_SEPARATOR)
}

/// Final path for one emitted filename
pub fn resolve_output_path(
    filename: &Path,
    out: &str,
    working_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    if filename.is_absolute() {
        return Ok(filename.to_path_buf());
    }

    let target = normalize_lexically(&working_dir.join(out));
    // symlinks are followed, so a linked output directory behaves like the directory
    match std::fs::metadata(&target) {
        Ok(meta) if meta.is_dir() => Ok(normalize_lexically(&target.join(filename))),
        Ok(meta) if meta.is_file() => Ok(target),
        Ok(_) => Err(GenerateError::OutputWrite {
            path: target,
            message: "output target exists but is neither a file nor a directory".to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if std::fs::symlink_metadata(&target).is_ok() {
                return Err(GenerateError::OutputWrite {
                    path: target,
                    message: "output target is a dangling symlink".to_string(),
                });
            }
            if ends_with_separator(out) {
                Ok(normalize_lexically(&target.join(filename)))
            } else {
                Ok(target)
            }
        }
        Err(e) => Err(GenerateError::OutputWrite {
            path: target,
            message: e.to_string(),
        }),
    }
}

fn ensure_parent(path: &Path) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GenerateError::OutputWrite {
                path: parent.to_path_buf(),
                message: format!("failed to create directory: {}", e),
            })?;
        }
    }
    Ok(())
}

/// Rewrite every filename to its final path and make sure each parent directory exists
pub fn normalize_outputs(
    files: Vec<FileOutput>,
    out: &str,
    working_dir: &Path,
) -> Result<Vec<FileOutput>, GenerateError> {
    files
        .into_iter()
        .map(|file| {
            let filename = resolve_output_path(&file.filename, out, working_dir)?;
            ensure_parent(&filename)?;
            debug!(from = %file.filename.display(), to = %filename.display(), "Output path");
            Ok(FileOutput {
                filename,
                content: file.content,
            })
        })
        .collect()
}
