use std::sync::{Arc, Mutex, PoisonError};

use batchreg_types::{AccountId, BatchId, BatchMetadata};
use serde::{Deserialize, Serialize};

/// Classification of registry events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Minted,
    Burned,
    Transferred,
    Flagged,
    Unflagged,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Minted => "mint",
            Self::Burned => "burn",
            Self::Transferred => "transfer",
            Self::Flagged => "flag",
            Self::Unflagged => "unflag",
        };
        write!(f, "{s}")
    }
}

/// Notification emitted after a registry operation commits.
///
/// Events are fire-and-observe: they describe state that is already
/// committed and are not part of the state model themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    Minted {
        id: BatchId,
        owner: AccountId,
        metadata: BatchMetadata,
    },
    Burned {
        id: BatchId,
        owner: AccountId,
    },
    Transferred {
        id: BatchId,
        from: AccountId,
        to: AccountId,
    },
    Flagged {
        id: BatchId,
        reason: String,
    },
    Unflagged {
        id: BatchId,
    },
}

impl RegistryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Minted { .. } => EventKind::Minted,
            Self::Burned { .. } => EventKind::Burned,
            Self::Transferred { .. } => EventKind::Transferred,
            Self::Flagged { .. } => EventKind::Flagged,
            Self::Unflagged { .. } => EventKind::Unflagged,
        }
    }

    /// The batch the event is about.
    pub fn batch_id(&self) -> BatchId {
        match self {
            Self::Minted { id, .. }
            | Self::Burned { id, .. }
            | Self::Transferred { id, .. }
            | Self::Flagged { id, .. }
            | Self::Unflagged { id } => *id,
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minted { id, owner, metadata } => {
                write!(f, "mint {id} owner={owner} origin={:?}", metadata.origin)
            }
            Self::Burned { id, owner } => write!(f, "burn {id} owner={owner}"),
            Self::Transferred { id, from, to } => write!(f, "transfer {id} {from} -> {to}"),
            Self::Flagged { id, reason } => write!(f, "flag {id} reason={reason:?}"),
            Self::Unflagged { id } => write!(f, "unflag {id}"),
        }
    }
}

/// Observer notified of every committed registry event, in commit order.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RegistryEvent);
}

/// Sink that keeps every event in a shared buffer.
///
/// Clones share the buffer: hand one clone to the registry and keep another
/// to inspect what was emitted.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<RegistryEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &RegistryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Sink that logs each event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &RegistryEvent) {
        tracing::info!(kind = %event.kind(), id = %event.batch_id(), "{event}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged() -> RegistryEvent {
        RegistryEvent::Flagged {
            id: BatchId::new(1),
            reason: "Contamination".into(),
        }
    }

    #[test]
    fn kind_and_batch_id() {
        let event = RegistryEvent::Transferred {
            id: BatchId::new(4),
            from: AccountId::derive("a"),
            to: AccountId::derive("b"),
        };
        assert_eq!(event.kind(), EventKind::Transferred);
        assert_eq!(event.batch_id(), BatchId::new(4));
        assert_eq!(format!("{}", EventKind::Unflagged), "unflag");
    }

    #[test]
    fn recording_sink_clones_share_buffer() {
        let sink = RecordingSink::new();
        let handle = sink.clone();
        sink.publish(&flagged());
        sink.publish(&RegistryEvent::Unflagged { id: BatchId::new(1) });

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.events()[0], flagged());
        assert_eq!(handle.drain().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn serialized_events_are_tagged() {
        let json = serde_json::to_value(flagged()).unwrap();
        assert_eq!(json["event"], "flagged");
        assert_eq!(json["id"], 1);
        assert_eq!(json["reason"], "Contamination");
    }

    #[test]
    fn display_names_the_operation() {
        assert_eq!(
            format!("{}", flagged()),
            "flag #1 reason=\"Contamination\""
        );
    }
}
