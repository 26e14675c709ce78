//! Port definitions
//!
//! Ports are the interfaces the push engine depends on but does not
//! implement: the remote API client, the index storage, the tree diff,
//! interactive prompts and mount attachment.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote lookups, upserts, trash and quota
//! - [`IIndexStore`] - Per-identifier index snapshots
//! - [`IChangeResolver`] - Local vs. remote tree diff producing changes
//! - [`IPrompter`] - Yes/no confirmations
//! - [`IMountRegistry`] - Detaching ephemeral mount points

pub mod change_resolver;
pub mod index_store;
pub mod mount_registry;
pub mod prompter;
pub mod remote_store;

pub use change_resolver::IChangeResolver;
pub use index_store::IIndexStore;
pub use mount_registry::IMountRegistry;
pub use prompter::{AutoConfirm, IPrompter};
pub use remote_store::{IRemoteStore, UpsertRequest};
