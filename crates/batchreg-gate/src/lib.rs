//! Access gate for the batch registry.
//!
//! The gate holds the administrator identity and the two registry-wide
//! switches (paused, mint enabled). The lifecycle engine consults it before
//! every mutating operation.
//!
//! # Quick Start
//!
//! ```rust
//! use batchreg_gate::{AccessGate, GateConfig};
//! use batchreg_types::{AccountId, RegistryError};
//!
//! let admin = AccountId::derive("admin");
//! let mut gate = AccessGate::new(&GateConfig::new(admin));
//! gate.set_paused(&admin, true).unwrap();
//! assert_eq!(gate.require_not_paused(), Err(RegistryError::Paused));
//! ```

pub mod config;
pub mod error;
pub mod gate;

pub use config::GateConfig;
pub use error::ConfigError;
pub use gate::AccessGate;
