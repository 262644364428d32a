//! # Local Filesystem Backend

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use super::backend::ObjectBackend;
use super::errors::{ObjectStoreError, ObjectStoreResult};

/// Objects stored as files under a root directory
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a key to a path, refusing anything that escapes the root
    fn full_path(&self, key: &str) -> ObjectStoreResult<PathBuf> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(key: &str, e: std::io::Error) -> ObjectStoreError {
    if e.kind() == ErrorKind::NotFound {
        ObjectStoreError::ObjectNotFound(key.to_string())
    } else {
        ObjectStoreError::IoError(e.to_string())
    }
}

impl ObjectBackend for LocalBackend {
    fn write_new(&self, key: &str, data: &[u8]) -> ObjectStoreResult<()> {
        let full_path = self.full_path(key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ObjectStoreError::IoError(e.to_string()))?;
        }

        // create_new makes "exists?" and "create" a single filesystem operation.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    ObjectStoreError::ObjectAlreadyExists(key.to_string())
                } else {
                    ObjectStoreError::IoError(e.to_string())
                }
            })?;

        let written = file.write_all(data).and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&full_path);
            return Err(ObjectStoreError::IoError(e.to_string()));
        }
        Ok(())
    }

    fn read(&self, key: &str) -> ObjectStoreResult<Vec<u8>> {
        let full_path = self.full_path(key)?;
        fs::read(&full_path).map_err(|e| io_error(key, e))
    }

    fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        let full_path = self.full_path(key)?;
        fs::remove_file(&full_path).map_err(|e| io_error(key, e))
    }

    fn exists(&self, key: &str) -> ObjectStoreResult<bool> {
        Ok(self.full_path(key)?.exists())
    }
}
