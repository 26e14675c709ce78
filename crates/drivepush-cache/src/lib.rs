//! drivepush Cache - Index snapshot persistence
//!
//! Implementations of the `IIndexStore` port from `drivepush-core`:
//!
//! - [`JsonIndexStore`] - one JSON document per remote identifier under
//!   `<sync root>/.drivepush/indices/`
//! - [`MemoryIndexStore`] - process-local map, for dry runs and tests
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use drivepush_cache::JsonIndexStore;
//!
//! let store = JsonIndexStore::new(Path::new("/home/user/Drive"));
//! // Use store as IIndexStore...
//! ```

pub mod json_store;
pub mod memory;

pub use json_store::{JsonIndexStore, INDEX_DIR};
pub use memory::MemoryIndexStore;

/// Errors that can occur in index store operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No snapshot is stored for the identifier
    #[error("Index entry not found: {0}")]
    NotFound(String),

    /// Reading or writing the backing file failed
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
