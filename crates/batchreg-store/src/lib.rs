//! Batch record storage for the batch registry.
//!
//! The store is the sole owner of per-batch state. It exposes whole-record
//! primitives only; combining them into one public operation is the job of
//! the lifecycle engine, which wraps multi-step updates in a [`Journal`].
//!
//! # Backends
//!
//! - [`InMemoryBatchStore`] — `BTreeMap`-backed, for tests and embedding

pub mod error;
pub mod journal;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use journal::Journal;
pub use memory::InMemoryBatchStore;
pub use traits::BatchStore;
