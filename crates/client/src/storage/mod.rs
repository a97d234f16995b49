//! Persistent key-value storage.
//!
//! Stores depend on the [`KeyValueStore`] trait rather than a concrete
//! backend. Two implementations are provided:
//!
//! - [`MemoryStore`] - process-lifetime map, used in tests and ephemeral runs
//! - [`FileStore`] - JSON file on disk, survives restarts

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage keys shared by the stores.
///
/// Renaming a key breaks rehydration of data written by older builds.
pub mod keys {
    /// Bearer token of the logged-in user.
    pub const TOKEN: &str = "token";

    /// User profile, serialized as JSON.
    pub const USER_INFO: &str = "userInfo";

    /// Points balance, serialized as a decimal string.
    pub const POINTS: &str = "points";

    /// Cart lines, serialized as a JSON array.
    pub const CART: &str = "cart";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String-keyed, string-valued persistent storage.
///
/// No transactionality is assumed: each call stands alone.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
