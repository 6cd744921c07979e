//! File System Module
//!
//! Filesystem abstractions for the shell. Two implementations:
//! - OsFs: the host filesystem (default for the binary)
//! - InMemoryFs: pure in-memory filesystem (embedding and tests)

pub mod in_memory_fs;
pub mod os_fs;
pub mod path;
pub mod types;

pub use in_memory_fs::InMemoryFs;
pub use os_fs::OsFs;
pub use path::{clean_path, resolve_path};
pub use types::*;
