use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    // --- Prompt file ---
    ConfigNotFound,
    ConfigReadFailed,
    ParseFailed,

    // --- Manifest ---
    ManifestNotFound,
    ManifestReadFailed,
    ManifestInvalid,

    // --- File I/O ---
    FileReadFailed,
    FileWriteFailed,

    // --- Validation ---
    ValidationFailed,
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Config Error: {message} (path: {path:?})")]
    Config { code: ErrorCode, message: String, path: PathBuf },

    #[error("Parse Error: {message} (context: {context})")]
    Parse { code: ErrorCode, message: String, context: String },

    #[error("Manifest Error: {message} (path: {path:?})")]
    Manifest { code: ErrorCode, message: String, path: PathBuf },

    #[error("File Error: {message} (path: {path:?})")]
    File { code: ErrorCode, message: String, path: PathBuf },

    #[error("Validation Error: {message} (context: {context})")]
    Validation { code: ErrorCode, message: String, context: String },
}

impl PatchError {
    pub fn code(&self) -> &ErrorCode {
        match self {
            PatchError::Config { code, .. }
            | PatchError::Parse { code, .. }
            | PatchError::Manifest { code, .. }
            | PatchError::File { code, .. }
            | PatchError::Validation { code, .. } => code,
        }
    }
}
