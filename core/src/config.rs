use crate::allow::AllowList;
use crate::error::{ErrorCode, PatchError, Result};
use crate::manifest::MANIFEST_FILE_NAME;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Block-format file holding the replacement texts.
    pub prompts_path: PathBuf,
    /// Defaults to `<base_dir>/patch_config.json` when `None`.
    pub manifest_path: Option<PathBuf>,
    /// Every manifest `targetFile` is resolved against this directory.
    pub base_dir: PathBuf,
    pub allow_list: AllowList,
    pub dry_run: bool,
}

impl Config {
    pub fn new(prompts_path: impl Into<PathBuf>) -> Self {
        Self {
            prompts_path: prompts_path.into(),
            manifest_path: None,
            base_dir: PathBuf::from("."),
            allow_list: AllowList::default(),
            dry_run: false,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(MANIFEST_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompts_path.as_os_str().is_empty() {
            return Err(PatchError::Validation {
                code: ErrorCode::ValidationFailed,
                message: "Prompt file path is empty".to_string(),
                context: "prompts_path".to_string(),
            });
        }
        if !self.base_dir.is_dir() {
            return Err(PatchError::Validation {
                code: ErrorCode::ValidationFailed,
                message: "Base directory does not exist or is not a directory".to_string(),
                context: self.base_dir.display().to_string(),
            });
        }
        self.allow_list.validate()
    }
}
