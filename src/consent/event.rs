use tokio::sync::broadcast;

use crate::consent::model::ConsentStatus;

/// Default capacity of the consent event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A handle for receiving consent change notifications.
pub type Subscription = broadcast::Receiver<ConsentEvent>;

/// Something observable happened to a [`ConsentStore`](crate::consent::ConsentStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsentEvent {
    /// Persisted state was read. `restored` is false when defaults were used.
    Loaded { status: ConsentStatus, restored: bool },
    /// A category or option changed through `toggle`.
    Toggled { identifier: String, value: bool },
    StatusChanged { old: ConsentStatus, new: ConsentStatus },
    /// `accept_all` / `reject_all` set every non-protected entry to `value`.
    AllSet { value: bool },
    /// Values were reset and storage cleared.
    Reset,
    /// A storage write failed; in-memory state is still authoritative.
    StorageFailed { key: Option<String>, reason: String },
}

#[derive(Debug)]
pub(crate) struct ConsentBus {
    tx: broadcast::Sender<ConsentEvent>,
}

impl Default for ConsentBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl ConsentBus {
    pub(crate) fn subscribe(&self) -> Subscription {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, ev: ConsentEvent) {
        // send() fails only when there are 0 receivers, which is fine.
        let _ = self.tx.send(ev);
    }
}
