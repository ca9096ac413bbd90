// ABOUTME: Local progress file bridging a create and its paired close
// ABOUTME: Small JSON side-file under the project's .sfdx directory

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use changecase_sdk::StepRef;

const PROGRESS_DIR: &str = ".sfdx";
const PROGRESS_FILE_NAME: &str = "changeConfig.json";

/// Payload written by create and consumed by the matching close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub change: String,
    #[serde(rename = "implementationSteps", default)]
    pub implementation_steps: Vec<StepRef>,
}

/// Handle on the per-project progress file.
pub struct ProgressFile {
    path: PathBuf,
}

impl ProgressFile {
    /// Progress file under the current working directory.
    pub fn in_project() -> Self {
        Self::in_dir(Path::new("."))
    }

    pub fn in_dir(dir: &Path) -> Self {
        ProgressFile {
            path: dir.join(PROGRESS_DIR).join(PROGRESS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded progress. A missing file is not an error.
    pub fn read(&self) -> Result<Option<Progress>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let progress = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(progress))
    }

    pub fn write(&self, progress: &Progress) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(progress)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Delete the file. Idempotent: absence is not an error.
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("deleting {}", self.path.display())),
        }
    }
}
