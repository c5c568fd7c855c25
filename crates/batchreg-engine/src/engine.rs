//! The lifecycle engine: every mutating registry operation.
//!
//! Per batch id the engine enforces
//!
//! ```text
//! absent -> active(unflagged) <-> active(flagged, frozen) -> absent
//! ```
//!
//! with transfer legal only while unflagged and burn legal from either active
//! state. Each public operation validates all preconditions before its first
//! write. Operations that write more than one field run inside a
//! [`Journal`], so they apply completely or not at all.

use batchreg_gate::{AccessGate, GateConfig};
use batchreg_store::{BatchStore, InMemoryBatchStore, Journal, StoreError, StoreResult};
use batchreg_types::{
    AccountId, BatchId, BatchMetadata, BatchRecord, FlagState, RegistryError,
};
use tracing::debug;

use crate::audit::{AuditReport, Auditor};
use crate::events::{EventSink, RegistryEvent};
use crate::ordering::{OrderingSource, TickingOrdering};
use crate::query::{BatchAsset, BatchQuery};

/// A batch registry instance.
///
/// All registry state lives here: the access gate, the batch store, and the
/// id counter. Instances are fully independent of each other.
pub struct Registry<S: BatchStore = InMemoryBatchStore> {
    gate: AccessGate,
    store: S,
    last_id: BatchId,
    ordering: Box<dyn OrderingSource>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl Registry<InMemoryBatchStore> {
    /// Create an empty in-memory registry.
    pub fn new(config: GateConfig) -> Self {
        Self::assemble(&config, InMemoryBatchStore::new(), BatchId::GENESIS)
    }
}

impl<S: BatchStore> Registry<S> {
    /// Create a registry over an existing store.
    ///
    /// `last_id` is the counter saved alongside the store; the next mint
    /// uses the id after it. Burned ids above every live record are only
    /// known to the counter, so it cannot be rebuilt from the store. Fails
    /// with [`StoreError::AlreadyExists`] when a live record is above
    /// `last_id`.
    pub fn with_store(config: GateConfig, store: S, last_id: BatchId) -> StoreResult<Self> {
        if let Some(&highest) = store.ids().last() {
            if highest > last_id {
                return Err(StoreError::AlreadyExists(highest));
            }
        }
        Ok(Self::assemble(&config, store, last_id))
    }

    fn assemble(config: &GateConfig, store: S, last_id: BatchId) -> Self {
        Self {
            gate: AccessGate::new(config),
            store,
            last_id,
            ordering: Box::new(TickingOrdering::new()),
            sinks: Vec::new(),
        }
    }

    /// Replace the source of flag timestamps.
    pub fn with_ordering(mut self, ordering: impl OrderingSource + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    /// Register an observer for committed events.
    pub fn add_sink(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Check every live record against the registry invariants.
    pub fn audit(&self) -> AuditReport {
        Auditor::audit(&self.store, self.last_id)
    }

    // ---------------------------------------------------------------
    // Admin operations
    // ---------------------------------------------------------------

    pub fn transfer_admin(
        &mut self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), RegistryError> {
        self.gate
            .transfer_admin(caller, new_admin)
            .inspect_err(|e| rejected("transfer_admin", e))
    }

    pub fn set_paused(&mut self, caller: &AccountId, value: bool) -> Result<bool, RegistryError> {
        self.gate
            .set_paused(caller, value)
            .inspect_err(|e| rejected("set_paused", e))
    }

    pub fn set_mint_enabled(
        &mut self,
        caller: &AccountId,
        value: bool,
    ) -> Result<bool, RegistryError> {
        self.gate
            .set_mint_enabled(caller, value)
            .inspect_err(|e| rejected("set_mint_enabled", e))
    }

    // ---------------------------------------------------------------
    // Lifecycle operations
    // ---------------------------------------------------------------

    /// Mint one batch owned by `caller`. Returns the new id.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        metadata: BatchMetadata,
    ) -> Result<BatchId, RegistryError> {
        self.gate
            .require_not_paused()
            .and_then(|()| self.gate.require_mint_enabled())
            .inspect_err(|e| rejected("mint", e))?;

        let mut cursor = self.last_id;
        let id = {
            let mut tx = Journal::begin(&mut self.store);
            let id = mint_into(&mut tx, &mut cursor, *caller, metadata.clone())
                .inspect_err(|e| rejected("mint", e))?;
            tx.commit();
            id
        };
        self.last_id = cursor;

        debug!(id = %id, owner = %caller, "batch minted");
        self.emit(RegistryEvent::Minted {
            id,
            owner: *caller,
            metadata,
        });
        Ok(id)
    }

    /// Mint every entry of `entries` in order, all or nothing.
    ///
    /// The first entry that fails validation aborts the call: every record
    /// created so far is rolled back, the id counter is left untouched, and no
    /// events are emitted. Returns the number of batches minted.
    pub fn batch_mint(
        &mut self,
        caller: &AccountId,
        entries: &[BatchMetadata],
    ) -> Result<usize, RegistryError> {
        self.gate
            .require_not_paused()
            .and_then(|()| self.gate.require_mint_enabled())
            .and_then(|()| self.gate.require_within_limit(entries.len()))
            .inspect_err(|e| rejected("batch_mint", e))?;

        let mut cursor = self.last_id;
        let mut minted = Vec::with_capacity(entries.len());
        {
            let mut tx = Journal::begin(&mut self.store);
            for (index, metadata) in entries.iter().enumerate() {
                match mint_into(&mut tx, &mut cursor, *caller, metadata.clone()) {
                    Ok(id) => minted.push(RegistryEvent::Minted {
                        id,
                        owner: *caller,
                        metadata: metadata.clone(),
                    }),
                    Err(e) => {
                        debug!(index, code = e.code(), "batch mint aborted, rolling back");
                        rejected("batch_mint", &e);
                        tx.rollback();
                        return Err(e);
                    }
                }
            }
            tx.commit();
        }
        self.last_id = cursor;

        let count = minted.len();
        debug!(count, last_id = %self.last_id, owner = %caller, "batch mint committed");
        for event in minted {
            self.emit(event);
        }
        Ok(count)
    }

    /// Move a batch from `sender` to `recipient`.
    ///
    /// `caller` must be `sender`, `sender` must own the batch, the batch must
    /// not be frozen, and the recipient must differ from the caller.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        id: BatchId,
        sender: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), RegistryError> {
        self.check_transfer(caller, id, sender, recipient)
            .inspect_err(|e| rejected("transfer", e))?;

        self.store.set_owner(id, *recipient)?;

        debug!(id = %id, from = %sender, to = %recipient, "batch transferred");
        self.emit(RegistryEvent::Transferred {
            id,
            from: *sender,
            to: *recipient,
        });
        Ok(())
    }

    /// Destroy a batch. The owner or the admin may burn, frozen or not.
    pub fn burn(&mut self, caller: &AccountId, id: BatchId) -> Result<(), RegistryError> {
        let record = self
            .gate
            .require_not_paused()
            .and_then(|()| self.live(id))
            .inspect_err(|e| rejected("burn", e))?;
        if record.owner != *caller && !self.gate.is_admin(caller) {
            rejected("burn", &RegistryError::NotOwner);
            return Err(RegistryError::NotOwner);
        }

        let removed = self.store.delete(id)?;

        debug!(id = %id, owner = %removed.owner, by = %caller, "batch burned");
        self.emit(RegistryEvent::Burned {
            id,
            owner: removed.owner,
        });
        Ok(())
    }

    /// Flag a batch for recall and freeze it. Admin only.
    ///
    /// The flag records the admin, the reason, and the host ordering value at
    /// the time of flagging.
    pub fn flag_for_recall(
        &mut self,
        caller: &AccountId,
        id: BatchId,
        reason: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.gate
            .require_admin(caller)
            .inspect_err(|e| rejected("flag_for_recall", e))?;
        let record = self.live(id).inspect_err(|e| rejected("flag_for_recall", e))?;
        if record.flag.flagged {
            rejected("flag_for_recall", &RegistryError::AlreadyFlagged);
            return Err(RegistryError::AlreadyFlagged);
        }

        let reason = reason.into();
        let flag_time = self.ordering.current();
        {
            let mut tx = Journal::begin(&mut self.store);
            tx.set_flag(id, FlagState::raised(*caller, reason.clone(), flag_time))?;
            tx.set_frozen(id, true)?;
            tx.commit();
        }

        debug!(id = %id, flag_time, reason = %reason, "batch flagged for recall");
        self.emit(RegistryEvent::Flagged { id, reason });
        Ok(())
    }

    /// Clear a recall flag and unfreeze the batch. Admin only.
    pub fn unflag(&mut self, caller: &AccountId, id: BatchId) -> Result<(), RegistryError> {
        self.gate
            .require_admin(caller)
            .inspect_err(|e| rejected("unflag", e))?;
        match self.store.get(id) {
            Some(record) if record.flag.flagged => {}
            _ => {
                rejected("unflag", &RegistryError::FlagNotAllowed);
                return Err(RegistryError::FlagNotAllowed);
            }
        }

        {
            let mut tx = Journal::begin(&mut self.store);
            tx.set_flag(id, FlagState::cleared(*caller))?;
            tx.set_frozen(id, false)?;
            tx.commit();
        }

        debug!(id = %id, "batch unflagged");
        self.emit(RegistryEvent::Unflagged { id });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn check_transfer(
        &self,
        caller: &AccountId,
        id: BatchId,
        sender: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), RegistryError> {
        self.gate.require_not_paused()?;
        if caller != sender {
            return Err(RegistryError::NotOwner);
        }
        let record = self.live(id)?;
        if record.owner != *sender {
            return Err(RegistryError::NotOwner);
        }
        if record.frozen {
            return Err(RegistryError::TransferFrozen);
        }
        if recipient == caller {
            return Err(RegistryError::InvalidTarget);
        }
        Ok(())
    }

    fn live(&self, id: BatchId) -> Result<BatchRecord, RegistryError> {
        self.store.get(id).ok_or(RegistryError::NotExists)
    }

    fn emit(&self, event: RegistryEvent) {
        for sink in &self.sinks {
            sink.publish(&event);
        }
    }
}

/// Validate `metadata` and create the next record in `store`, advancing
/// `cursor` only on success.
fn mint_into<S: BatchStore>(
    store: &mut S,
    cursor: &mut BatchId,
    owner: AccountId,
    metadata: BatchMetadata,
) -> Result<BatchId, RegistryError> {
    metadata.validate()?;
    let id = cursor.next().ok_or(RegistryError::LimitExceeded)?;
    store.create(id, owner, metadata)?;
    *cursor = id;
    Ok(id)
}

fn rejected(operation: &'static str, error: &RegistryError) {
    debug!(operation, code = error.code(), error = %error, "operation rejected");
}

impl<S: BatchStore> BatchQuery for Registry<S> {
    fn last_id(&self) -> BatchId {
        self.last_id
    }

    fn owner(&self, id: BatchId) -> Option<AccountId> {
        self.store.get(id).map(|r| r.owner)
    }

    fn metadata(&self, id: BatchId) -> Option<BatchMetadata> {
        self.store.get(id).map(|r| r.metadata)
    }

    fn flag(&self, id: BatchId) -> Option<FlagState> {
        self.store.get(id).map(|r| r.flag)
    }

    fn is_frozen(&self, id: BatchId) -> bool {
        self.store.get(id).is_some_and(|r| r.frozen)
    }

    fn admin(&self) -> AccountId {
        self.gate.admin()
    }

    fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    fn is_mint_enabled(&self) -> bool {
        self.gate.is_mint_enabled()
    }

    fn record(&self, id: BatchId) -> Option<BatchRecord> {
        self.store.get(id)
    }

    fn batches_owned_by(&self, owner: &AccountId) -> Vec<BatchId> {
        self.store
            .ids()
            .into_iter()
            .filter(|id| self.store.get(*id).is_some_and(|r| r.owner == *owner))
            .collect()
    }

    fn flagged_batches(&self) -> Vec<BatchId> {
        self.store
            .ids()
            .into_iter()
            .filter(|id| self.store.get(*id).is_some_and(|r| r.flag.flagged))
            .collect()
    }

    fn batch_count(&self) -> usize {
        self.store.len()
    }
}

impl<S: BatchStore> BatchAsset for Registry<S> {
    fn owner_of(&self, id: BatchId) -> Option<AccountId> {
        self.owner(id)
    }

    fn is_transferable(&self, id: BatchId) -> bool {
        self.store.get(id).is_some_and(|r| !r.frozen)
    }

    fn latest_id(&self) -> BatchId {
        self.last_id
    }

    fn transfer_batch(
        &mut self,
        caller: &AccountId,
        id: BatchId,
        sender: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), RegistryError> {
        self.transfer(caller, id, sender, recipient)
    }
}
