//! File-storage capability used by the generator and the registrar.

use crate::error::{Result, SeedError};
use std::fs;
use std::path::Path;

pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<String>;

    /// Write `content`, creating parent directories as needed.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

impl<F: FileStore + ?Sized> FileStore for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        (**self).write(path, content)
    }
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let to_write_error = |source| SeedError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(to_write_error)?;
            }
        }
        fs::write(path, content).map_err(to_write_error)
    }
}
