//! Durable storage backends for the queue snapshot.
//!
//! The queue persists a single record under a fixed key and rewrites it in
//! full after every mutation, so a backend only needs whole-value reads and
//! writes.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::Result;

/// Key/value persistence surviving queue restarts.
pub trait QueueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the write fails.
    fn store(&self, key: &str, value: &str) -> Result<()>;
}
