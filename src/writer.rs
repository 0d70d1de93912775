//! Artifact writing.
//!
//! Resolves logical artifact paths under the project root and writes
//! each file atomically (temp file in the target directory, then rename)
//! so an interrupted run never leaves a truncated file. Dry-run mode
//! logs every would-be write instead of touching disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::ForgeError;
use crate::generate::Artifact;

const DRY_RUN_PREVIEW_LENGTH: usize = 200;

pub struct ProjectWriter {
    root: PathBuf,
    dry_run: bool,
}

impl ProjectWriter {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    pub fn write_all(&self, artifacts: &[Artifact]) -> Result<(), ForgeError> {
        for artifact in artifacts {
            let path = self.root.join(&artifact.path);
            if self.dry_run {
                log_dry_run(&path, &artifact.content);
            } else {
                write_atomic(&path, &artifact.content)?;
                tracing::info!(path = %path.display(), "generated");
            }
        }
        if self.dry_run {
            tracing::info!("dry run complete; no files were written");
        } else {
            tracing::info!(root = %self.root.display(), files = artifacts.len(), "project written");
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ForgeError> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| ForgeError::Io(e.error))?;
    Ok(())
}

fn log_dry_run(path: &Path, content: &str) {
    let preview: String = content
        .chars()
        .take(DRY_RUN_PREVIEW_LENGTH)
        .collect::<String>()
        .replace('\n', "\\n");
    let truncated = content.len() > DRY_RUN_PREVIEW_LENGTH;
    tracing::info!(
        path = %path.display(),
        bytes = content.len(),
        "[dry run] would write"
    );
    tracing::debug!(
        preview = %format!("{}{}", preview, if truncated { "..." } else { "" }),
        "[dry run] content preview"
    );
}
