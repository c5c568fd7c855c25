//! Undo journal that turns a sequence of store primitives into one atomic
//! unit.
//!
//! A [`Journal`] borrows a store mutably and is itself a [`BatchStore`].
//! Every successful mutation pushes the inverse operation onto an undo log.
//! [`Journal::commit`] keeps the writes; [`Journal::rollback`] (or dropping
//! the journal without committing) replays the undo log newest-first, leaving
//! the store exactly as it was when the journal began.

use batchreg_types::{AccountId, BatchId, BatchMetadata, BatchRecord, FlagState};

use crate::error::StoreResult;
use crate::traits::BatchStore;

/// Inverse of one applied primitive.
#[derive(Debug)]
enum Undo {
    Created(BatchId),
    Deleted(BatchRecord),
    Owner(BatchId, AccountId),
    Flag(BatchId, FlagState),
    Frozen(BatchId, bool),
}

/// Transactional view over a [`BatchStore`].
pub struct Journal<'a, S: BatchStore> {
    store: &'a mut S,
    undo: Vec<Undo>,
}

impl<'a, S: BatchStore> Journal<'a, S> {
    /// Start a transaction over `store`.
    pub fn begin(store: &'a mut S) -> Self {
        Self {
            store,
            undo: Vec::new(),
        }
    }

    /// Number of primitives applied so far.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Keep every write. Returns the number of primitives committed.
    pub fn commit(mut self) -> usize {
        let applied = self.undo.len();
        self.undo.clear();
        applied
    }

    /// Discard every write.
    pub fn rollback(mut self) {
        self.revert();
    }

    fn revert(&mut self) {
        if self.undo.is_empty() {
            return;
        }
        tracing::debug!(entries = self.undo.len(), "rolling back journal");
        while let Some(entry) = self.undo.pop() {
            let result = match entry {
                Undo::Created(id) => self.store.delete(id).map(drop),
                Undo::Deleted(record) => self.store.put(record),
                Undo::Owner(id, owner) => self.store.set_owner(id, owner).map(drop),
                Undo::Flag(id, flag) => self.store.set_flag(id, flag).map(drop),
                Undo::Frozen(id, frozen) => self.store.set_frozen(id, frozen).map(drop),
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "journal undo failed");
            }
        }
    }
}

impl<S: BatchStore> Drop for Journal<'_, S> {
    fn drop(&mut self) {
        self.revert();
    }
}

impl<S: BatchStore> BatchStore for Journal<'_, S> {
    fn get(&self, id: BatchId) -> Option<BatchRecord> {
        self.store.get(id)
    }

    fn contains(&self, id: BatchId) -> bool {
        self.store.contains(id)
    }

    fn create(
        &mut self,
        id: BatchId,
        owner: AccountId,
        metadata: BatchMetadata,
    ) -> StoreResult<()> {
        self.store.create(id, owner, metadata)?;
        self.undo.push(Undo::Created(id));
        Ok(())
    }

    fn put(&mut self, record: BatchRecord) -> StoreResult<()> {
        let id = record.id;
        self.store.put(record)?;
        self.undo.push(Undo::Created(id));
        Ok(())
    }

    fn set_owner(&mut self, id: BatchId, owner: AccountId) -> StoreResult<AccountId> {
        let previous = self.store.set_owner(id, owner)?;
        self.undo.push(Undo::Owner(id, previous));
        Ok(previous)
    }

    fn set_flag(&mut self, id: BatchId, flag: FlagState) -> StoreResult<FlagState> {
        let previous = self.store.set_flag(id, flag)?;
        self.undo.push(Undo::Flag(id, previous.clone()));
        Ok(previous)
    }

    fn set_frozen(&mut self, id: BatchId, frozen: bool) -> StoreResult<bool> {
        let previous = self.store.set_frozen(id, frozen)?;
        self.undo.push(Undo::Frozen(id, previous));
        Ok(previous)
    }

    fn delete(&mut self, id: BatchId) -> StoreResult<BatchRecord> {
        let removed = self.store.delete(id)?;
        self.undo.push(Undo::Deleted(removed.clone()));
        Ok(removed)
    }

    fn ids(&self) -> Vec<BatchId> {
        self.store.ids()
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::InMemoryBatchStore;

    fn alice() -> AccountId {
        AccountId::derive("alice")
    }

    fn bob() -> AccountId {
        AccountId::derive("bob")
    }

    fn meta() -> BatchMetadata {
        BatchMetadata::new("Farm A", "Barley", 1_600_000_000, 50)
    }

    fn seeded() -> InMemoryBatchStore {
        let mut store = InMemoryBatchStore::new();
        store.create(BatchId::new(1), alice(), meta()).unwrap();
        store
    }

    #[test]
    fn commit_keeps_writes() {
        let mut store = seeded();
        let mut tx = Journal::begin(&mut store);
        tx.create(BatchId::new(2), bob(), meta()).unwrap();
        tx.set_owner(BatchId::new(1), bob()).unwrap();
        assert_eq!(tx.commit(), 2);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(BatchId::new(1)).unwrap().owner, bob());
    }

    #[test]
    fn rollback_restores_exact_state() {
        let mut store = seeded();
        let before = store.clone();

        let mut tx = Journal::begin(&mut store);
        tx.create(BatchId::new(2), bob(), meta()).unwrap();
        tx.set_flag(BatchId::new(1), FlagState::raised(bob(), "recall", 9))
            .unwrap();
        tx.set_frozen(BatchId::new(1), true).unwrap();
        tx.set_owner(BatchId::new(1), bob()).unwrap();
        tx.delete(BatchId::new(1)).unwrap();
        assert_eq!(tx.len(), 5);
        tx.rollback();

        assert_eq!(store, before);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let mut store = seeded();
        let before = store.clone();
        {
            let mut tx = Journal::begin(&mut store);
            tx.create(BatchId::new(2), bob(), meta()).unwrap();
            tx.create(BatchId::new(3), bob(), meta()).unwrap();
        }
        assert_eq!(store, before);
    }

    #[test]
    fn failed_primitive_is_not_journaled() {
        let mut store = seeded();
        let mut tx = Journal::begin(&mut store);
        let err = tx.create(BatchId::new(1), bob(), meta()).unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(BatchId::new(1)));
        assert!(tx.is_empty());
        tx.rollback();
        assert_eq!(store.get(BatchId::new(1)).unwrap().owner, alice());
    }

    #[test]
    fn reads_see_uncommitted_writes() {
        let mut store = seeded();
        let mut tx = Journal::begin(&mut store);
        tx.set_owner(BatchId::new(1), bob()).unwrap();
        assert_eq!(tx.get(BatchId::new(1)).unwrap().owner, bob());
        assert_eq!(tx.ids(), vec![BatchId::new(1)]);
    }
}
