//! Whole-registry invariant check.
//!
//! Walks every live record and reports anything that a correct sequence of
//! registry operations could never produce.

use batchreg_store::BatchStore;
use batchreg_types::BatchId;

/// Result of auditing a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub last_id: BatchId,
    pub records_checked: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if no violations were found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub id: BatchId,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Freeze status disagrees with the flag.
    FreezeMismatch,
    /// A live record carries an id the counter has not reached.
    IdAheadOfCounter,
    /// The record's own id differs from the id it is stored under.
    IdMismatch,
    /// An unflagged record still carries a reason or flag time.
    StaleFlag,
    /// Mint-time metadata validation no longer passes.
    InvalidMetadata,
}

/// Registry invariant auditor.
pub struct Auditor;

impl Auditor {
    pub fn audit<S: BatchStore>(store: &S, last_id: BatchId) -> AuditReport {
        let ids = store.ids();
        let mut violations = Vec::new();

        for &id in &ids {
            let Some(record) = store.get(id) else {
                continue;
            };

            if record.id != id {
                violations.push(Violation {
                    id,
                    kind: ViolationKind::IdMismatch,
                    description: format!("stored under {id} but carries {}", record.id),
                });
            }

            if id > last_id || id == BatchId::GENESIS {
                violations.push(Violation {
                    id,
                    kind: ViolationKind::IdAheadOfCounter,
                    description: format!("id {id} outside minted range ..={last_id}"),
                });
            }

            if !record.is_consistent() {
                violations.push(Violation {
                    id,
                    kind: ViolationKind::FreezeMismatch,
                    description: format!(
                        "frozen={} but flagged={}",
                        record.frozen, record.flag.flagged
                    ),
                });
            }

            if !record.flag.flagged
                && (!record.flag.reason.is_empty() || record.flag.flag_time != 0)
            {
                violations.push(Violation {
                    id,
                    kind: ViolationKind::StaleFlag,
                    description: "unflagged record retains reason or flag time".into(),
                });
            }

            if record.metadata.validate().is_err() {
                violations.push(Violation {
                    id,
                    kind: ViolationKind::InvalidMetadata,
                    description: "metadata fails mint-time validation".into(),
                });
            }
        }

        AuditReport {
            last_id,
            records_checked: ids.len(),
            violations,
        }
    }
}
