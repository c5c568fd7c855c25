//! Read-only projections and the interop capability.
//!
//! External collaborators (recall oracles, supply-chain trackers, governance
//! tooling) depend on these traits rather than on [`crate::Registry`]. None
//! of the query methods can fail: absence is an empty result.

use batchreg_types::{AccountId, BatchId, BatchMetadata, BatchRecord, FlagState, RegistryError};

/// Read-only view of registry state.
pub trait BatchQuery {
    /// Highest id ever minted; [`BatchId::GENESIS`] before the first mint.
    fn last_id(&self) -> BatchId;

    fn owner(&self, id: BatchId) -> Option<AccountId>;

    fn metadata(&self, id: BatchId) -> Option<BatchMetadata>;

    fn flag(&self, id: BatchId) -> Option<FlagState>;

    /// `false` for batches that do not exist.
    fn is_frozen(&self, id: BatchId) -> bool;

    fn admin(&self) -> AccountId;

    fn is_paused(&self) -> bool;

    fn is_mint_enabled(&self) -> bool;

    /// Full copy of one record.
    fn record(&self, id: BatchId) -> Option<BatchRecord>;

    /// Ids currently owned by `owner`, ascending.
    fn batches_owned_by(&self, owner: &AccountId) -> Vec<BatchId>;

    /// Ids currently flagged for recall, ascending.
    fn flagged_batches(&self) -> Vec<BatchId>;

    /// Number of live batches.
    fn batch_count(&self) -> usize;
}

/// Minimal ownership contract for modules that move batches around without
/// knowing how the registry stores them.
pub trait BatchAsset {
    fn owner_of(&self, id: BatchId) -> Option<AccountId>;

    /// `true` when the batch exists and is not frozen.
    fn is_transferable(&self, id: BatchId) -> bool;

    fn latest_id(&self) -> BatchId;

    /// Single-hop transfer: `caller` must be `sender` and the current owner.
    fn transfer_batch(
        &mut self,
        caller: &AccountId,
        id: BatchId,
        sender: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), RegistryError>;
}
