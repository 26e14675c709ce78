//! drivepush Core - Domain types and port definitions
//!
//! This crate holds everything the push engine shares between its crates:
//! - **Domain entities** - `RemoteFile`, `Change`, `Index`, `MountPoint`, `QuotaStatus`
//! - **Port definitions** - Traits for collaborators: `IRemoteStore`, `IIndexStore`,
//!   `IChangeResolver`, `IPrompter`, `IMountRegistry`
//! - **Configuration** - YAML-backed settings for push behaviour and logging
//!
//! # Architecture
//!
//! The domain module is pure data and rules with no I/O. Ports define the
//! trait interfaces that adapters (remote API client, index storage, tree
//! diff, terminal prompts) implement outside this crate.

pub mod config;
pub mod domain;
pub mod ports;
