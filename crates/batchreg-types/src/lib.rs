//! Foundation types for the batch registry.
//!
//! This crate provides the identity, record, and error types shared by every
//! other registry crate. Every other crate in the workspace depends on
//! `batchreg-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] — Account identity derived from a label or raw bytes
//! - [`BatchId`] — Sequential batch identifier, never reused
//! - [`BatchMetadata`] — Write-once description of a batch of goods
//! - [`FlagState`] — Recall flag carried by every live batch
//! - [`BatchRecord`] — Owner, metadata, flag, and freeze status of one batch
//! - [`RegistryError`] — The closed set of failure reasons with stable codes

pub mod account;
pub mod batch;
pub mod error;

pub use account::AccountId;
pub use batch::{BatchId, BatchMetadata, BatchRecord, FlagState, MAX_BATCH};
pub use error::{RegistryError, TypeError};
