//! Filesystem trait and implementations.
//!
//! Reads are whole-file. Writes are scoped: the handle is opened, written,
//! synced and closed inside a single call, on every exit path.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid UTF-8 in {path}")]
    Utf8 { path: String },
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Read file contents as a string.
    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    /// Create or truncate a file and write `data` to it.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Write data atomically to a path (write to temp, then rename).
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;
}

/// Append `suffix` to the final component of `path`.
///
/// `golden/select.t` with `.actual` becomes `golden/select.t.actual`.
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        let bytes = fs::read(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::Utf8 {
            path: path.display().to_string(),
        })
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        // Dropped (and closed) when this scope ends, whether or not a write fails
        let mut file = fs::File::create(path)?;
        file.write_all(data)?;
        file.sync_data()?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let temp_path = sibling_with_suffix(path, ".tmp");

        if let Err(e) = self.write_file(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    failing: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all files in the mock filesystem.
    pub fn files(&self) -> HashMap<PathBuf, Vec<u8>> {
        self.files.read().unwrap().clone()
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Get content of a specific file as text.
    pub fn get_text(&self, path: &Path) -> Option<String> {
        self.get_file(path)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.write().unwrap().insert(path.into(), data.into());
    }

    /// Make every subsequent write to `path` fail with a permission error.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.write().unwrap().insert(path.into());
    }

    fn check_writable(&self, path: &Path) -> Result<(), FsError> {
        if self.failing.read().unwrap().contains(path) {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write refused: {}", path.display()),
            )));
        }
        Ok(())
    }
}

impl Filesystem for MockFilesystem {
    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        let files = self.files.read().unwrap();
        match files.get(path) {
            Some(data) => String::from_utf8(data.clone()).map_err(|_| FsError::Utf8 {
                path: path.display().to_string(),
            }),
            None => Err(FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            ))),
        }
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.check_writable(path)?;
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.write_file(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ===========================================
    // Path helpers
    // ===========================================

    #[test]
    fn test_sibling_with_suffix_keeps_extension() {
        let path = sibling_with_suffix(Path::new("golden/select.t"), ".actual");
        assert_eq!(path, PathBuf::from("golden/select.t.actual"));
    }

    #[test]
    fn test_sibling_with_suffix_no_extension() {
        let path = sibling_with_suffix(Path::new("fixture"), ".tmp");
        assert_eq!(path, PathBuf::from("fixture.tmp"));
    }

    // ===========================================
    // MockFilesystem
    // ===========================================

    #[test]
    fn test_mock_read_missing_file() {
        let fs = MockFilesystem::new();
        let err = fs.read_file(Path::new("/nope.t")).unwrap_err();
        match err {
            FsError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mock_write_then_read() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/a.t");

        fs.write_file(&path, b"hello\n").expect("write");

        assert_eq!(fs.read_file(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_mock_write_atomic_overwrites() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/a.t");
        fs.add_file(path.clone(), "old");

        fs.write_atomic(&path, b"new").expect("write");

        assert_eq!(fs.get_text(&path), Some("new".to_string()));
        assert_eq!(fs.files().len(), 1);
    }

    #[test]
    fn test_mock_injected_write_fault() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/a.t.actual");
        fs.fail_writes_to(path.clone());

        let err = fs.write_file(&path, b"data").unwrap_err();
        assert!(err.to_string().contains("write refused"));
        assert!(fs.get_file(&path).is_none());
    }

    #[test]
    fn test_mock_invalid_utf8() {
        let fs = MockFilesystem::new();
        fs.add_file("/tmp/bin.t", vec![0xffu8, 0xfe]);

        let err = fs.read_file(Path::new("/tmp/bin.t")).unwrap_err();
        assert!(matches!(err, FsError::Utf8 { .. }));
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let fs = MockFilesystem::new();
        let handle = fs.clone();
        handle.add_file("/tmp/x", "x");
        assert_eq!(fs.get_text(Path::new("/tmp/x")), Some("x".to_string()));
    }

    // ===========================================
    // RealFilesystem
    // ===========================================

    #[test]
    fn test_real_write_file_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("case.t");
        let fs = RealFilesystem;

        fs.write_file(&path, b"SELECT 1;\n").unwrap();

        assert_eq!(fs.read_file(&path).unwrap(), "SELECT 1;\n");
    }

    #[test]
    fn test_real_write_file_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("case.t");
        let fs = RealFilesystem;

        fs.write_file(&path, b"a much longer first version\n").unwrap();
        fs.write_file(&path, b"short\n").unwrap();

        assert_eq!(fs.read_file(&path).unwrap(), "short\n");
    }

    #[test]
    fn test_real_write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("case.t");
        let fs = RealFilesystem;

        fs.write_atomic(&path, b"content").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
        assert!(!sibling_with_suffix(&path, ".tmp").exists());
    }

    #[test]
    fn test_real_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("case.t.actual");
        let fs = RealFilesystem;

        assert!(matches!(fs.write_file(&path, b"x"), Err(FsError::Io(_))));
    }

    #[test]
    fn test_real_read_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.t");
        std::fs::write(&path, [0xc3, 0x28]).unwrap();

        assert!(matches!(
            RealFilesystem.read_file(&path),
            Err(FsError::Utf8 { .. })
        ));
    }
}
