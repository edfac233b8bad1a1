use crate::error::{ErrorCode, PatchError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Reads a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| PatchError::File {
        code: ErrorCode::FileReadFailed,
        message: format!("Failed to read file: {}", e),
        path: path.to_path_buf(),
    })?;
    String::from_utf8(bytes).map_err(|_| PatchError::File {
        code: ErrorCode::FileReadFailed,
        message: "File is not valid UTF-8".to_string(),
        path: path.to_path_buf(),
    })
}

/// Replaces `path` with `content` via a sibling temp file and a rename, so
/// readers see either the old or the new file, never a partial one. A
/// symlinked `path` is followed: the file it points to is replaced and the
/// link is kept.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = resolved.as_path();

    let write_err = |p: &Path, e: std::io::Error| PatchError::File {
        code: ErrorCode::FileWriteFailed,
        message: format!("Failed to write file: {}", e),
        path: p.to_path_buf(),
    };

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let result = (|| {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| write_err(&temp_path, e))?;
        temp_file.write_all(content.as_bytes()).map_err(|e| write_err(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| write_err(&temp_path, e))?;

        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&temp_path, meta.permissions()).map_err(|e| write_err(&temp_path, e))?;
        }

        fs::rename(&temp_path, path).map_err(|e| write_err(path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
