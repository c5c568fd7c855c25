use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type parsing and conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown error code: {0}")]
    UnknownCode(u32),
}

/// Failure reasons reported by registry operations.
///
/// The numeric codes are part of the external interface and never change.
/// A failed operation leaves the registry exactly as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum RegistryError {
    /// Caller is not the admin, or minting is disabled.
    #[error("not authorized")]
    NotAuthorized,

    /// Caller is not the declared sender or the current owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// No live batch with this id.
    #[error("batch does not exist")]
    NotExists,

    /// The batch is already flagged for recall.
    #[error("batch is already flagged")]
    AlreadyFlagged,

    /// The registry is paused.
    #[error("registry is paused")]
    Paused,

    /// Recipient or new admin equals the caller.
    #[error("invalid target")]
    InvalidTarget,

    /// Mint metadata failed validation.
    #[error("invalid metadata")]
    InvalidMetadata,

    /// Batch mint request exceeds the configured limit.
    #[error("batch limit exceeded")]
    LimitExceeded,

    /// The batch has no active flag to clear.
    #[error("flag operation not allowed")]
    FlagNotAllowed,

    /// The batch is frozen by a recall flag.
    #[error("transfer blocked: batch is frozen")]
    TransferFrozen,
}

impl RegistryError {
    /// Every error kind, in code order.
    pub const ALL: [RegistryError; 10] = [
        Self::NotAuthorized,
        Self::NotOwner,
        Self::NotExists,
        Self::AlreadyFlagged,
        Self::Paused,
        Self::InvalidTarget,
        Self::InvalidMetadata,
        Self::LimitExceeded,
        Self::FlagNotAllowed,
        Self::TransferFrozen,
    ];

    /// The stable numeric code.
    pub const fn code(self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::NotOwner => 101,
            Self::NotExists => 102,
            Self::AlreadyFlagged => 103,
            Self::Paused => 104,
            Self::InvalidTarget => 105,
            Self::InvalidMetadata => 106,
            Self::LimitExceeded => 107,
            Self::FlagNotAllowed => 108,
            Self::TransferFrozen => 109,
        }
    }

    /// Look up an error kind by its numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// The variant name, as used in scripts and reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotAuthorized => "NotAuthorized",
            Self::NotOwner => "NotOwner",
            Self::NotExists => "NotExists",
            Self::AlreadyFlagged => "AlreadyFlagged",
            Self::Paused => "Paused",
            Self::InvalidTarget => "InvalidTarget",
            Self::InvalidMetadata => "InvalidMetadata",
            Self::LimitExceeded => "LimitExceeded",
            Self::FlagNotAllowed => "FlagNotAllowed",
            Self::TransferFrozen => "TransferFrozen",
        }
    }
}

impl TryFrom<u32> for RegistryError {
    type Error = TypeError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(TypeError::UnknownCode(code))
    }
}
