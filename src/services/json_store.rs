//! Whole-file JSON documents: read once at startup, overwritten on every change.

use std::{fs, io::ErrorKind, path::Path};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// Reads `path`, or returns `None` when the file does not exist yet.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::Io(e)),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| AppError::StoreCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Overwrites `path` with `value`. No locking: the last writer wins.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let fail = |reason: String| AppError::PersistenceWriteFailure {
        path: path.to_path_buf(),
        reason,
    };

    let json = serde_json::to_string(value).map_err(|e| fail(e.to_string()))?;
    fs::write(path, json).map_err(|e| fail(e.to_string()))?;

    tracing::debug!(path = %path.display(), "store saved");
    Ok(())
}
