use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;

use crate::error::UnpackError;

pub fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open capture: {:?}", path))
}

/// Create `dir` and its parents if missing. Safe to call repeatedly and from several threads.
pub fn ensure_dir(dir: &Path) -> Result<(), UnpackError> {
    fs::create_dir_all(dir).map_err(|source| UnpackError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), UnpackError> {
    fs::write(path, bytes).map_err(|e| UnpackError::encode_write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = std::env::temp_dir()
            .join(format!("kinect_unpack_dirs_{}", std::process::id()))
            .join("t4");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_ensure_dir_reports_failure() {
        let base = std::env::temp_dir()
            .join(format!("kinect_unpack_blocked_{}", std::process::id()));
        fs::write(&base, b"not a directory").unwrap();
        let err = ensure_dir(&base.join("sub")).unwrap_err();
        assert!(matches!(err, UnpackError::CreateDir { .. }));
        fs::remove_file(&base).ok();
    }
}
