//! In-Memory File System Implementation
//!
//! A pure in-memory filesystem for embedding the shell and for tests.
//! Entries are keyed by normalized absolute path. Writers returned from
//! `open_for_write` share the table, so bytes land in the file as they
//! are written.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::path::{clean_path, dirname};
use super::types::*;

#[derive(Debug, Clone)]
enum FsEntry {
    File { content: Vec<u8> },
    Directory,
}

type EntryTable = HashMap<String, FsEntry>;

/// In-memory virtual file system.
pub struct InMemoryFs {
    data: Arc<RwLock<EntryTable>>,
    user: String,
    home: String,
}

impl InMemoryFs {
    /// Create a filesystem holding `/` and an empty `/home/user`.
    pub fn new() -> Self {
        Self::with_user("user", "/home/user")
    }

    /// Create a filesystem for `user` whose home (and starting directory) is `home`.
    pub fn with_user(user: &str, home: &str) -> Self {
        let mut data = HashMap::new();
        data.insert("/".to_string(), FsEntry::Directory);
        let fs = Self {
            data: Arc::new(RwLock::new(data)),
            user: user.to_string(),
            home: normalize_path(home),
        };
        let home = fs.home.clone();
        fs.mkdir_sync(&home);
        fs
    }

    fn read(&self) -> RwLockReadGuard<'_, EntryTable> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntryTable> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory and its parents, for seeding.
    pub fn mkdir_sync(&self, path: &str) {
        let mut data = self.write();
        let normalized = normalize_path(path);
        ensure_parent_dirs(&mut data, &normalized);
        data.entry(normalized).or_insert(FsEntry::Directory);
    }

    /// Write a file, creating parent directories, for seeding.
    pub fn write_file_sync(&self, path: &str, content: &[u8]) {
        let mut data = self.write();
        let normalized = normalize_path(path);
        ensure_parent_dirs(&mut data, &normalized);
        data.insert(normalized, FsEntry::File { content: content.to_vec() });
    }

    /// Every path in the table, sorted.
    pub fn get_all_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Path utilities (free functions operating on the table directly)
// ============================================================================

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        clean_path(path)
    } else {
        clean_path(&format!("/{}", path))
    }
}

fn ensure_parent_dirs(data: &mut EntryTable, path: &str) {
    let dir = dirname(path);
    if dir == "/" || data.contains_key(&dir) {
        return;
    }
    ensure_parent_dirs(data, &dir);
    data.insert(dir, FsEntry::Directory);
}

fn child_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{}/", dir)
    }
}

fn has_children(data: &EntryTable, dir: &str) -> bool {
    let prefix = child_prefix(dir);
    data.keys().any(|k| k != dir && k.starts_with(&prefix))
}

fn not_found(path: &str, operation: &str) -> FsError {
    FsError::NotFound { path: path.to_string(), operation: operation.to_string() }
}

/// The parent of `path` must exist and be a directory.
fn check_parent(data: &EntryTable, path: &str, operation: &str) -> Result<(), FsError> {
    match data.get(&dirname(path)) {
        Some(FsEntry::Directory) => Ok(()),
        Some(FsEntry::File { .. }) => Err(FsError::NotDirectory {
            path: path.to_string(),
            operation: operation.to_string(),
        }),
        None => Err(not_found(path, operation)),
    }
}

/// Streams written bytes into a file entry of the shared table.
struct MemFileWriter {
    data: Arc<RwLock<EntryTable>>,
    path: String,
}

impl Write for MemFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        match data.get_mut(&self.path) {
            Some(FsEntry::File { content }) => {
                content.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(io::ErrorKind::NotFound, format!("{} was removed", self.path))),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// FileSystem trait implementation
// ============================================================================

impl FileSystem for InMemoryFs {
    fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let data = self.read();
        let normalized = normalize_path(path);
        match data.get(&normalized) {
            Some(FsEntry::Directory) => {}
            Some(FsEntry::File { .. }) => {
                return Err(FsError::NotDirectory { path: path.to_string(), operation: "scandir".to_string() })
            }
            None => return Err(not_found(path, "scandir")),
        }

        let prefix = child_prefix(&normalized);
        let mut entries: Vec<DirEntry> = data
            .iter()
            .filter(|(p, _)| **p != normalized)
            .filter_map(|(p, entry)| {
                let rest = p.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(DirEntry {
                    name: rest.to_string(),
                    is_directory: matches!(entry, FsEntry::Directory),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_directory(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);

        match data.get(&normalized) {
            Some(FsEntry::File { .. }) => {
                return Err(FsError::AlreadyExists { path: path.to_string(), operation: "mkdir".to_string() })
            }
            Some(FsEntry::Directory) if recursive => return Ok(()),
            Some(FsEntry::Directory) => {
                return Err(FsError::AlreadyExists { path: path.to_string(), operation: "mkdir".to_string() })
            }
            None => {}
        }

        if recursive {
            let mut current = String::new();
            for part in normalized.split('/').filter(|p| !p.is_empty()) {
                current = format!("{}/{}", current, part);
                match data.get(&current) {
                    Some(FsEntry::Directory) => {}
                    Some(FsEntry::File { .. }) => {
                        return Err(FsError::NotDirectory { path: path.to_string(), operation: "mkdir".to_string() })
                    }
                    None => {
                        data.insert(current.clone(), FsEntry::Directory);
                    }
                }
            }
            return Ok(());
        }

        check_parent(&data, &normalized, "mkdir")?;
        data.insert(normalized, FsEntry::Directory);
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<(), FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);
        match data.get(&normalized) {
            Some(FsEntry::File { .. }) => {
                data.remove(&normalized);
                Ok(())
            }
            Some(FsEntry::Directory) => Err(FsError::IsDirectory { path: path.to_string(), operation: "unlink".to_string() }),
            None => Err(not_found(path, "unlink")),
        }
    }

    fn remove_directory_recursive(&self, path: &str) -> Result<(), FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);
        if normalized == "/" {
            return Err(FsError::PermissionDenied { path: path.to_string(), operation: "rm".to_string() });
        }
        match data.get(&normalized) {
            Some(FsEntry::Directory) => {}
            Some(FsEntry::File { .. }) => {
                return Err(FsError::NotDirectory { path: path.to_string(), operation: "rm".to_string() })
            }
            None => return Err(not_found(path, "rm")),
        }

        let prefix = child_prefix(&normalized);
        data.retain(|k, _| *k != normalized && !k.starts_with(&prefix));
        Ok(())
    }

    fn remove_empty_directory(&self, path: &str) -> Result<(), FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);
        match data.get(&normalized) {
            Some(FsEntry::Directory) => {}
            Some(FsEntry::File { .. }) => {
                return Err(FsError::NotDirectory { path: path.to_string(), operation: "rmdir".to_string() })
            }
            None => return Err(not_found(path, "rmdir")),
        }
        if normalized == "/" || has_children(&data, &normalized) {
            return Err(FsError::NotEmpty { path: path.to_string(), operation: "rmdir".to_string() });
        }
        data.remove(&normalized);
        Ok(())
    }

    fn create_empty_file(&self, path: &str) -> Result<(), FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);
        if let Some(FsEntry::Directory) = data.get(&normalized) {
            return Err(FsError::IsDirectory { path: path.to_string(), operation: "open".to_string() });
        }
        check_parent(&data, &normalized, "open")?;
        data.insert(normalized, FsEntry::File { content: Vec::new() });
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let data = self.read();
        match data.get(&normalize_path(path)) {
            Some(FsEntry::File { content }) => Ok(content.clone()),
            Some(FsEntry::Directory) => Err(FsError::IsDirectory { path: path.to_string(), operation: "read".to_string() }),
            None => Err(not_found(path, "open")),
        }
    }

    fn open_for_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn Write>, FsError> {
        let mut data = self.write();
        let normalized = normalize_path(path);
        match data.get_mut(&normalized) {
            Some(FsEntry::Directory) => {
                return Err(FsError::IsDirectory { path: path.to_string(), operation: "open".to_string() })
            }
            Some(FsEntry::File { content }) => {
                if mode == WriteMode::Truncate {
                    content.clear();
                }
            }
            None => {
                check_parent(&data, &normalized, "open")?;
                data.insert(normalized.clone(), FsEntry::File { content: Vec::new() });
            }
        }
        Ok(Box::new(MemFileWriter { data: Arc::clone(&self.data), path: normalized }))
    }

    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>, FsError> {
        let content = self.read_file(path)?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let data = self.read();
        match data.get(&normalize_path(path)) {
            Some(FsEntry::File { content }) => Ok(FileStat { is_file: true, is_directory: false, size: content.len() as u64 }),
            Some(FsEntry::Directory) => Ok(FileStat { is_file: false, is_directory: true, size: 0 }),
            None => Err(not_found(path, "stat")),
        }
    }

    fn current_user(&self) -> Result<String, FsError> {
        Ok(self.user.clone())
    }

    fn home_directory(&self) -> Result<String, FsError> {
        Ok(self.home.clone())
    }

    fn current_working_directory(&self) -> Result<String, FsError> {
        Ok(self.home.clone())
    }
}
