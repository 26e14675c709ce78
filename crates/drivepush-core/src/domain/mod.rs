//! Domain entities and business rules
//!
//! - Newtypes for remote identifiers and metadata field masks
//! - Remote/local file metadata
//! - Changes and their operation kinds
//! - Index snapshots used as the conflict tie-breaker
//! - Mount points and quota classification
//! - Remote path helpers

pub mod change;
pub mod errors;
pub mod file;
pub mod index;
pub mod mount;
pub mod newtypes;
pub mod path;
pub mod quota;

pub use change::{Change, Operation};
pub use errors::DomainError;
pub use file::RemoteFile;
pub use index::Index;
pub use mount::MountPoint;
pub use newtypes::{FieldMask, FileId};
pub use quota::{Quota, QuotaStatus, DEFAULT_WARNING_PERCENT};
