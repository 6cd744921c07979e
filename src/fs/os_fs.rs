//! Host File System
//!
//! `FileSystem` backed by `std::fs` and the process environment.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};

use super::types::*;

/// The real filesystem of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        Self
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

impl FileSystem for OsFs {
    fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let reader = fs::read_dir(path).map_err(|e| FsError::from_io(&e, "scandir", path))?;
        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|e| FsError::from_io(&e, "scandir", path))?;
            let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_directory(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let result = if recursive { fs::create_dir_all(path) } else { fs::create_dir(path) };
        result.map_err(|e| FsError::from_io(&e, "mkdir", path))
    }

    fn remove_file(&self, path: &str) -> Result<(), FsError> {
        fs::remove_file(path).map_err(|e| FsError::from_io(&e, "unlink", path))
    }

    fn remove_directory_recursive(&self, path: &str) -> Result<(), FsError> {
        fs::remove_dir_all(path).map_err(|e| FsError::from_io(&e, "rm", path))
    }

    fn remove_empty_directory(&self, path: &str) -> Result<(), FsError> {
        fs::remove_dir(path).map_err(|e| FsError::from_io(&e, "rmdir", path))
    }

    fn create_empty_file(&self, path: &str) -> Result<(), FsError> {
        File::create(path)
            .map(|_| ())
            .map_err(|e| FsError::from_io(&e, "open", path))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        fs::read(path).map_err(|e| FsError::from_io(&e, "open", path))
    }

    fn open_for_write(&self, path: &str, mode: WriteMode) -> Result<Box<dyn Write>, FsError> {
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            WriteMode::Truncate => options.write(true).truncate(true),
            WriteMode::Append => options.append(true),
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let file = options.open(path).map_err(|e| FsError::from_io(&e, "open", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>, FsError> {
        let file = File::open(path).map_err(|e| FsError::from_io(&e, "open", path))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let meta = fs::metadata(path).map_err(|e| FsError::from_io(&e, "stat", path))?;
        Ok(FileStat {
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
            size: meta.len(),
        })
    }

    fn current_user(&self) -> Result<String, FsError> {
        first_env(&["USER", "USERNAME"]).ok_or_else(|| FsError::other("cannot determine current user"))
    }

    fn home_directory(&self) -> Result<String, FsError> {
        first_env(&["HOME", "USERPROFILE"]).ok_or_else(|| FsError::other("$HOME is not defined"))
    }

    fn current_working_directory(&self) -> Result<String, FsError> {
        let cwd = env::current_dir().map_err(|e| FsError::from_io(&e, "getcwd", "."))?;
        Ok(cwd.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> String {
        let dir = env::temp_dir().join(format!("raven-osfs-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_write_append_and_read() {
        let dir = scratch_dir("write");
        let file = format!("{}/out.txt", dir);
        let fs = OsFs::new();

        {
            let mut w = fs.open_for_write(&file, WriteMode::Truncate).unwrap();
            w.write_all(b"one\n").unwrap();
        }
        {
            let mut w = fs.open_for_write(&file, WriteMode::Append).unwrap();
            w.write_all(b"two\n").unwrap();
        }
        assert_eq!(fs.read_file(&file).unwrap(), b"one\ntwo\n");

        let mut content = String::new();
        fs.open_for_read(&file).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "one\ntwo\n");

        fs.remove_directory_recursive(&dir).unwrap();
    }

    #[test]
    fn test_directories() {
        let dir = scratch_dir("dirs");
        let fs = OsFs::new();

        fs.create_directory(&format!("{}/a/b", dir), true).unwrap();
        fs.create_empty_file(&format!("{}/z.txt", dir)).unwrap();
        let names: Vec<(String, bool)> = fs
            .list_directory(&dir)
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.is_directory))
            .collect();
        assert_eq!(names, vec![("a".to_string(), true), ("z.txt".to_string(), false)]);

        assert!(fs.remove_empty_directory(&format!("{}/a", dir)).is_err());
        fs.remove_empty_directory(&format!("{}/a/b", dir)).unwrap();
        assert!(fs.stat(&format!("{}/a", dir)).unwrap().is_directory);

        fs.remove_directory_recursive(&dir).unwrap();
        assert!(!fs.exists(&dir));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let fs = OsFs::new();
        let err = fs.read_file("/definitely/not/here.txt").unwrap_err();
        assert!(err.is_not_found());
    }
}
