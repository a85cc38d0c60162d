//! In-process change notification hub
//!
//! Publishes a `RecordChange` after every committed mutation so open
//! sessions can refresh without polling. Delivery is at-least-once and
//! best-effort: a lagging subscriber may miss events (the broadcast ring
//! overwrites) and must resynchronize by re-fetching, and consumers must
//! tolerate duplicates.

use serde::Serialize;
use tokio::sync::broadcast;

/// Collection a change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Profiles,
    Channels,
    Shorts,
    Withdrawals,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Channels => "channels",
            Self::Shorts => "shorts",
            Self::Withdrawals => "withdrawals",
        }
    }
}

/// A committed record mutation
#[derive(Debug, Clone, Serialize)]
pub struct RecordChange {
    pub collection: Collection,
    /// Record id
    pub id: String,
    /// Owner of the record (identity-provider user id)
    pub user_id: String,
    /// Status after the mutation
    pub status: String,
}

/// Broadcast hub for record changes
pub struct EventHub {
    sender: broadcast::Sender<RecordChange>,
}

impl EventHub {
    /// Create a hub with the given ring-buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    ///
    /// A send with no subscribers is not an error.
    pub fn publish(&self, change: RecordChange) {
        tracing::debug!(
            collection = change.collection.as_str(),
            id = %change.id,
            status = %change.status,
            "Record change published"
        );
        let _ = self.sender.send(change);
    }

    /// Subscribe to subsequent changes
    pub fn subscribe(&self) -> broadcast::Receiver<RecordChange> {
        self.sender.subscribe()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(256)
    }
}
