use std::fs;
use std::path::Path;

use crate::error::{Result, SakeError};

/// Writes `bytes` to `path`, creating or truncating the file.
pub fn save_key(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|e| SakeError::WriteError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}
