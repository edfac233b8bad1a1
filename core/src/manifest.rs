use crate::error::{ErrorCode, PatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name, looked up in the base directory.
pub const MANIFEST_FILE_NAME: &str = "patch_config.json";

/// One `(promptKey, variableName, targetFile)` row of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub prompt_key: String,
    pub variable_name: String,
    /// Relative to the run's base directory.
    pub target_file: PathBuf,
}

/// Ordered manifest. Order only matters when several entries touch the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PatchError::Manifest {
                code: ErrorCode::ManifestNotFound,
                message: "Manifest file not found".to_string(),
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|e| PatchError::Manifest {
            code: ErrorCode::ManifestReadFailed,
            message: format!("Could not read manifest: {}", e),
            path: path.to_path_buf(),
        })?;

        Self::from_json(&text).map_err(|e| match e {
            PatchError::Manifest { code, message, .. } => PatchError::Manifest {
                code,
                message,
                path: path.to_path_buf(),
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PatchError::Manifest {
            code: ErrorCode::ManifestInvalid,
            message: format!("Manifest is not a valid entry list: {}", e),
            path: PathBuf::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }
}
