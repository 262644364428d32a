//! # Object Backend Trait

use super::errors::ObjectStoreResult;

/// Where object bytes are kept
pub trait ObjectBackend: Send + Sync + std::fmt::Debug {
    /// Write a new object. Fails with `ObjectAlreadyExists` instead of overwriting.
    fn write_new(&self, key: &str, data: &[u8]) -> ObjectStoreResult<()>;

    /// Read an object
    fn read(&self, key: &str) -> ObjectStoreResult<Vec<u8>>;

    /// Delete an object
    fn delete(&self, key: &str) -> ObjectStoreResult<()>;

    /// Check if an object exists
    fn exists(&self, key: &str) -> ObjectStoreResult<bool>;
}
