//! File System Types
//!
//! Core types and the trait every filesystem backend implements.

use std::io::{self, Read, Write};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("ENOTEMPTY: directory not empty, {operation} '{path}'")]
    NotEmpty { path: String, operation: String },

    #[error("EPERM: operation not permitted, {operation} '{path}'")]
    PermissionDenied { path: String, operation: String },

    #[error("{operation} '{path}': {message}")]
    Io { path: String, operation: String, message: String },

    #[error("{message}")]
    Other { message: String },
}

impl FsError {
    /// Map an OS error onto the matching variant.
    pub fn from_io(err: &io::Error, operation: &str, path: &str) -> Self {
        let path = path.to_string();
        let operation = operation.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path, operation },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path, operation },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path, operation },
            _ => FsError::Io { path, operation, message: err.to_string() },
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        FsError::Other { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

/// How `open_for_write` treats existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Result of `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
}

/// Entry returned by `list_directory`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Filesystem and user-environment operations the interpreter depends on.
///
/// All paths handed to these methods are already resolved to absolute form.
pub trait FileSystem: Send + Sync {
    /// Entries of a directory, sorted by name.
    fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;

    fn create_directory(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    fn remove_file(&self, path: &str) -> Result<(), FsError>;

    fn remove_directory_recursive(&self, path: &str) -> Result<(), FsError>;

    fn remove_empty_directory(&self, path: &str) -> Result<(), FsError>;

    /// Create a file, truncating it if it already exists.
    fn create_empty_file(&self, path: &str) -> Result<(), FsError>;

    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError>;

    fn open_for_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn Write>, FsError>;

    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>, FsError>;

    fn stat(&self, path: &str) -> Result<FileStat, FsError>;

    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    fn current_user(&self) -> Result<String, FsError>;

    fn home_directory(&self) -> Result<String, FsError>;

    fn current_working_directory(&self) -> Result<String, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FsError::NotFound { path: "/a".to_string(), operation: "open".to_string() };
        assert_eq!(err.to_string(), "ENOENT: no such file or directory, open '/a'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(FsError::from_io(&io_err, "stat", "/x").is_not_found());

        let io_err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(FsError::from_io(&io_err, "read", "/x").to_string(), "read '/x': boom");
    }
}
