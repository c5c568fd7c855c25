use std::collections::BTreeMap;

use batchreg_types::{AccountId, BatchId, BatchMetadata, BatchRecord, FlagState};

use crate::error::{StoreError, StoreResult};
use crate::traits::BatchStore;

/// In-memory, `BTreeMap`-based batch store.
///
/// Intended for tests and embedding. Records are kept in id order so listing
/// queries come out sorted without extra work.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryBatchStore {
    records: BTreeMap<BatchId, BatchRecord>,
}

impl InMemoryBatchStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, id: BatchId) -> StoreResult<&mut BatchRecord> {
        self.records.get_mut(&id).ok_or(StoreError::NotFound(id))
    }
}

impl BatchStore for InMemoryBatchStore {
    fn get(&self, id: BatchId) -> Option<BatchRecord> {
        self.records.get(&id).cloned()
    }

    fn contains(&self, id: BatchId) -> bool {
        self.records.contains_key(&id)
    }

    fn create(
        &mut self,
        id: BatchId,
        owner: AccountId,
        metadata: BatchMetadata,
    ) -> StoreResult<()> {
        self.put(BatchRecord::minted(id, owner, metadata))
    }

    fn put(&mut self, record: BatchRecord) -> StoreResult<()> {
        if self.records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    fn set_owner(&mut self, id: BatchId, owner: AccountId) -> StoreResult<AccountId> {
        let record = self.record_mut(id)?;
        Ok(std::mem::replace(&mut record.owner, owner))
    }

    fn set_flag(&mut self, id: BatchId, flag: FlagState) -> StoreResult<FlagState> {
        let record = self.record_mut(id)?;
        Ok(std::mem::replace(&mut record.flag, flag))
    }

    fn set_frozen(&mut self, id: BatchId, frozen: bool) -> StoreResult<bool> {
        let record = self.record_mut(id)?;
        Ok(std::mem::replace(&mut record.frozen, frozen))
    }

    fn delete(&mut self, id: BatchId) -> StoreResult<BatchRecord> {
        self.records.remove(&id).ok_or(StoreError::NotFound(id))
    }

    fn ids(&self) -> Vec<BatchId> {
        self.records.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::derive("farm-a")
    }

    fn meta(origin: &str) -> BatchMetadata {
        BatchMetadata::new(origin, "Wheat", 1_627_849_200, 10)
    }

    #[test]
    fn create_and_get() {
        let mut store = InMemoryBatchStore::new();
        store.create(BatchId::new(1), owner(), meta("Farm A")).unwrap();

        let record = store.get(BatchId::new(1)).unwrap();
        assert_eq!(record.owner, owner());
        assert_eq!(record.metadata.origin, "Farm A");
        assert!(!record.frozen);
        assert_eq!(record.flag, FlagState::cleared(owner()));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryBatchStore::new();
        assert!(store.get(BatchId::new(9)).is_none());
        assert!(!store.contains(BatchId::new(9)));
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let mut store = InMemoryBatchStore::new();
        store.create(BatchId::new(1), owner(), meta("A")).unwrap();
        let err = store.create(BatchId::new(1), owner(), meta("B")).unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(BatchId::new(1)));
        assert_eq!(store.get(BatchId::new(1)).unwrap().metadata.origin, "A");
    }

    #[test]
    fn setters_return_previous_values() {
        let mut store = InMemoryBatchStore::new();
        let id = BatchId::new(1);
        store.create(id, owner(), meta("A")).unwrap();

        let next = AccountId::derive("distributor");
        assert_eq!(store.set_owner(id, next).unwrap(), owner());
        assert!(!store.set_frozen(id, true).unwrap());

        let raised = FlagState::raised(next, "mold", 4);
        let previous = store.set_flag(id, raised.clone()).unwrap();
        assert!(!previous.flagged);

        let record = store.get(id).unwrap();
        assert_eq!(record.owner, next);
        assert_eq!(record.flag, raised);
        assert!(record.frozen);
    }

    #[test]
    fn setters_on_missing_record_fail() {
        let mut store = InMemoryBatchStore::new();
        let id = BatchId::new(3);
        assert_eq!(store.set_owner(id, owner()), Err(StoreError::NotFound(id)));
        assert_eq!(store.set_frozen(id, true), Err(StoreError::NotFound(id)));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_whole_record() {
        let mut store = InMemoryBatchStore::new();
        let id = BatchId::new(1);
        store.create(id, owner(), meta("A")).unwrap();

        let removed = store.delete(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.get(id).is_none());
        assert_eq!(store.delete(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn ids_are_sorted() {
        let mut store = InMemoryBatchStore::new();
        for n in [5, 1, 3] {
            store.create(BatchId::new(n), owner(), meta("A")).unwrap();
        }
        assert_eq!(
            store.ids(),
            vec![BatchId::new(1), BatchId::new(3), BatchId::new(5)]
        );
        assert_eq!(store.len(), 3);
    }
}
