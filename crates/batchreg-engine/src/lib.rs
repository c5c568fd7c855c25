//! Lifecycle engine for the batch registry.
//!
//! This crate is the public operation surface of the registry. It provides:
//! - [`Registry`], which enforces the batch state machine on top of an
//!   [`AccessGate`](batchreg_gate::AccessGate) and a
//!   [`BatchStore`](batchreg_store::BatchStore)
//! - [`BatchQuery`] read projections and the [`BatchAsset`] interop contract
//! - [`RegistryEvent`] notifications delivered to [`EventSink`]s after commit
//! - [`OrderingSource`] for host-supplied flag timestamps
//! - [`Auditor`] for whole-registry invariant checks
//!
//! # Quick Start
//!
//! ```rust
//! use batchreg_engine::{BatchQuery, Registry};
//! use batchreg_gate::GateConfig;
//! use batchreg_types::{AccountId, BatchMetadata, RegistryError};
//!
//! let admin = AccountId::derive("admin");
//! let farm = AccountId::derive("farm-a");
//! let shop = AccountId::derive("shop");
//! let mut registry = Registry::new(GateConfig::new(admin));
//!
//! let meta = BatchMetadata::new("Farm A", "Wheat, Sugar", 1_627_849_200, 100);
//! let id = registry.mint(&farm, meta).unwrap();
//! registry.flag_for_recall(&admin, id, "Contamination").unwrap();
//! assert!(registry.is_frozen(id));
//! assert_eq!(
//!     registry.transfer(&farm, id, &farm, &shop),
//!     Err(RegistryError::TransferFrozen)
//! );
//! ```

pub mod audit;
pub mod engine;
pub mod events;
pub mod ordering;
pub mod query;

pub use audit::{AuditReport, Auditor, Violation, ViolationKind};
pub use engine::Registry;
pub use events::{EventKind, EventSink, RecordingSink, RegistryEvent, TracingSink};
pub use ordering::{ManualOrdering, OrderingSource, TickingOrdering};
pub use query::{BatchAsset, BatchQuery};
