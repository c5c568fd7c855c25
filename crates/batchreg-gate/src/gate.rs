use batchreg_types::{AccountId, RegistryError, MAX_BATCH};
use tracing::info;

use crate::config::GateConfig;

/// Administrator identity and the registry-wide switches.
///
/// Every mutating registry operation passes through the gate before touching
/// batch state. The `require_*` checks never modify anything; the setters are
/// admin-only and change exactly one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessGate {
    admin: AccountId,
    paused: bool,
    mint_enabled: bool,
    max_batch: usize,
}

impl AccessGate {
    /// Build the gate from `config`. A batch limit above [`MAX_BATCH`] is
    /// capped at [`MAX_BATCH`].
    pub fn new(config: &GateConfig) -> Self {
        Self {
            admin: config.admin,
            paused: config.paused,
            mint_enabled: config.mint_enabled,
            max_batch: config.max_batch.min(MAX_BATCH),
        }
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_mint_enabled(&self) -> bool {
        self.mint_enabled
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    pub fn is_admin(&self, caller: &AccountId) -> bool {
        *caller == self.admin
    }

    // ---------------------------------------------------------------
    // Preconditions
    // ---------------------------------------------------------------

    pub fn require_admin(&self, caller: &AccountId) -> Result<(), RegistryError> {
        if !self.is_admin(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<(), RegistryError> {
        if self.paused {
            return Err(RegistryError::Paused);
        }
        Ok(())
    }

    /// Disabled minting reports `NotAuthorized`.
    pub fn require_mint_enabled(&self) -> Result<(), RegistryError> {
        if !self.mint_enabled {
            return Err(RegistryError::NotAuthorized);
        }
        Ok(())
    }

    pub fn require_within_limit(&self, len: usize) -> Result<(), RegistryError> {
        if len > self.max_batch || len > MAX_BATCH {
            return Err(RegistryError::LimitExceeded);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Admin operations
    // ---------------------------------------------------------------

    /// Hand administration to `new_admin`.
    ///
    /// The caller must be the admin and may not name themselves.
    pub fn transfer_admin(
        &mut self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        if new_admin == *caller {
            return Err(RegistryError::InvalidTarget);
        }
        info!(from = %self.admin, to = %new_admin, "admin transferred");
        self.admin = new_admin;
        Ok(())
    }

    pub fn set_paused(&mut self, caller: &AccountId, value: bool) -> Result<bool, RegistryError> {
        self.require_admin(caller)?;
        self.paused = value;
        info!(paused = value, "pause switch set");
        Ok(value)
    }

    pub fn set_mint_enabled(
        &mut self,
        caller: &AccountId,
        value: bool,
    ) -> Result<bool, RegistryError> {
        self.require_admin(caller)?;
        self.mint_enabled = value;
        info!(mint_enabled = value, "mint switch set");
        Ok(value)
    }
}
