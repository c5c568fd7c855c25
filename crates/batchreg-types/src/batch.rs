use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::RegistryError;

/// Upper bound on the number of entries accepted by a single batch mint.
pub const MAX_BATCH: usize = 1000;

/// Sequential identifier of a batch.
///
/// Ids start at 1 and are never reused, even after the batch is burned.
/// [`BatchId::GENESIS`] (0) is the last id of a registry that has not minted
/// anything yet; it never names a batch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    pub const GENESIS: BatchId = BatchId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// The id that follows this one, or `None` once the id space is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for BatchId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Description of a batch of goods, fixed at mint time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Where the goods were produced.
    pub origin: String,
    /// Free-text ingredient list.
    pub ingredients: String,
    /// Manufacturing timestamp (seconds since UNIX epoch).
    pub manufacturing_date: i64,
    /// Optional expiration timestamp.
    #[serde(default)]
    pub expiration_date: Option<i64>,
    /// Number of units in the batch.
    pub batch_size: u64,
}

impl BatchMetadata {
    pub fn new(
        origin: impl Into<String>,
        ingredients: impl Into<String>,
        manufacturing_date: i64,
        batch_size: u64,
    ) -> Self {
        Self {
            origin: origin.into(),
            ingredients: ingredients.into(),
            manufacturing_date,
            expiration_date: None,
            batch_size,
        }
    }

    pub fn with_expiration(mut self, expiration_date: i64) -> Self {
        self.expiration_date = Some(expiration_date);
        self
    }

    /// Mint-time validation: non-empty origin and ingredients, positive
    /// manufacturing date, non-zero size.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.origin.is_empty()
            || self.ingredients.is_empty()
            || self.manufacturing_date <= 0
            || self.batch_size == 0
        {
            return Err(RegistryError::InvalidMetadata);
        }
        Ok(())
    }
}

/// Recall flag attached to every live batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagState {
    pub flagged: bool,
    pub reason: String,
    /// Identity that last wrote the flag.
    pub flagged_by: AccountId,
    /// Host ordering counter at flag time; 0 while unflagged.
    pub flag_time: u64,
}

impl FlagState {
    /// The unflagged state, attributed to `by`.
    pub fn cleared(by: AccountId) -> Self {
        Self {
            flagged: false,
            reason: String::new(),
            flagged_by: by,
            flag_time: 0,
        }
    }

    pub fn raised(by: AccountId, reason: impl Into<String>, flag_time: u64) -> Self {
        Self {
            flagged: true,
            reason: reason.into(),
            flagged_by: by,
            flag_time,
        }
    }
}

/// Everything the registry knows about one live batch.
///
/// Owner, metadata, flag, and freeze status live in one record so they are
/// created and destroyed together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: BatchId,
    pub owner: AccountId,
    pub metadata: BatchMetadata,
    pub flag: FlagState,
    pub frozen: bool,
}

impl BatchRecord {
    /// A freshly minted record: unflagged, not frozen, flag attributed to
    /// the minting owner.
    pub fn minted(id: BatchId, owner: AccountId, metadata: BatchMetadata) -> Self {
        Self {
            id,
            owner,
            metadata,
            flag: FlagState::cleared(owner),
            frozen: false,
        }
    }

    /// `true` when the freeze status agrees with the flag.
    pub fn is_consistent(&self) -> bool {
        self.frozen == self.flag.flagged
    }
}
