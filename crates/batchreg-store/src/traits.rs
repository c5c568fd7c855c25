use batchreg_types::{AccountId, BatchId, BatchMetadata, BatchRecord, FlagState};

use crate::error::StoreResult;

/// Storage backend for batch records.
///
/// All implementations must satisfy these invariants:
/// - A record is created and deleted whole. Owner, metadata, flag, and
///   freeze status never exist independently of each other.
/// - Metadata is write-once: no primitive changes it after `create`.
/// - Reads hand out copies; callers never hold references into the store.
/// - Mutating primitives return the value they replaced so a caller can
///   journal and undo them.
pub trait BatchStore {
    /// Read a record by id. Returns `None` if it does not exist.
    fn get(&self, id: BatchId) -> Option<BatchRecord>;

    /// Check whether a record exists.
    fn contains(&self, id: BatchId) -> bool {
        self.get(id).is_some()
    }

    /// Create a freshly minted record owned by `owner`.
    ///
    /// Fails with `AlreadyExists` if the id is taken.
    fn create(&mut self, id: BatchId, owner: AccountId, metadata: BatchMetadata)
        -> StoreResult<()>;

    /// Insert a complete record, replacing nothing.
    ///
    /// Used to restore a deleted record when a transaction rolls back.
    fn put(&mut self, record: BatchRecord) -> StoreResult<()>;

    /// Replace the owner. Returns the previous owner.
    fn set_owner(&mut self, id: BatchId, owner: AccountId) -> StoreResult<AccountId>;

    /// Replace the flag. Returns the previous flag.
    fn set_flag(&mut self, id: BatchId, flag: FlagState) -> StoreResult<FlagState>;

    /// Replace the freeze status. Returns the previous status.
    fn set_frozen(&mut self, id: BatchId, frozen: bool) -> StoreResult<bool>;

    /// Remove a record entirely. Returns the removed record.
    fn delete(&mut self, id: BatchId) -> StoreResult<BatchRecord>;

    /// All live ids in ascending order.
    fn ids(&self) -> Vec<BatchId>;

    /// Number of live records.
    fn len(&self) -> usize {
        self.ids().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
