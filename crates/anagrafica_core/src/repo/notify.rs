//! Snapshot fan-out to registry subscribers.
//!
//! # Responsibility
//! - Deliver every committed snapshot to every live subscriber, in commit
//!   order.
//! - Never block the publishing writer on a slow subscriber.
//!
//! # Invariants
//! - `publish` is only called while the store's write lock is held, so
//!   subscribers observe snapshots in commit order.
//! - `Unbounded` keeps every snapshot; `DropOldest` keeps the newest
//!   `capacity` snapshots and counts what it discarded.
//! - Late subscribers receive future snapshots only.

use super::person_repo::Snapshot;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Opaque handle identifying one subscription.
pub type SubscriptionId = Uuid;

/// Buffering policy for one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Keep every snapshot until the subscriber reads it.
    #[default]
    Unbounded,
    /// Keep at most `capacity` pending snapshots, discarding the oldest.
    DropOldest { capacity: usize },
}

impl DeliveryPolicy {
    pub(crate) fn normalized(self) -> Self {
        match self {
            Self::DropOldest { capacity } => Self::DropOldest {
                capacity: capacity.max(1),
            },
            other => other,
        }
    }
}

#[derive(Debug, Default)]
struct SubscriberShared {
    dropped: AtomicU64,
}

/// Receiving end of a registry subscription.
///
/// Dropping it disconnects the subscriber; the store prunes it on the next
/// publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<Snapshot>,
    shared: Arc<SubscriberShared>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Blocks until the next snapshot. Returns `None` once the store is gone.
    pub fn recv(&self) -> Option<Snapshot> {
        self.receiver.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Snapshot> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Returns every pending snapshot, oldest first.
    pub fn drain(&self) -> Vec<Snapshot> {
        self.receiver.try_iter().collect()
    }

    /// Number of snapshots discarded by the drop-oldest policy.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

struct Subscriber {
    id: SubscriptionId,
    sender: Sender<Snapshot>,
    /// Present for bounded channels; used to evict the oldest pending item.
    evictor: Option<Receiver<Snapshot>>,
    shared: Arc<SubscriberShared>,
}

impl Subscriber {
    fn is_connected(&self) -> bool {
        Arc::strong_count(&self.shared) > 1
    }

    /// Returns `false` when the channel is disconnected.
    fn deliver(&self, snapshot: &Snapshot) -> bool {
        let mut pending = snapshot.clone();
        loop {
            match self.sender.try_send(pending) {
                Ok(()) => return true,
                Err(TrySendError::Disconnected(_)) => return false,
                Err(TrySendError::Full(rejected)) => {
                    pending = rejected;
                    if let Some(evictor) = &self.evictor {
                        if evictor.try_recv().is_ok() {
                            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }
        }
    }
}

/// Subscriber list owned by the registry store.
pub(crate) struct SubscriberHub {
    default_policy: DeliveryPolicy,
    subscribers: Vec<Subscriber>,
}

impl SubscriberHub {
    pub(crate) fn new(default_policy: DeliveryPolicy) -> Self {
        Self {
            default_policy: default_policy.normalized(),
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn default_policy(&self) -> DeliveryPolicy {
        self.default_policy
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn subscribe(&mut self, policy: DeliveryPolicy) -> Subscription {
        let policy = policy.normalized();
        let (sender, receiver, evictor) = match policy {
            DeliveryPolicy::Unbounded => {
                let (tx, rx) = channel::unbounded();
                (tx, rx, None)
            }
            DeliveryPolicy::DropOldest { capacity } => {
                let (tx, rx) = channel::bounded(capacity);
                let evictor = rx.clone();
                (tx, rx, Some(evictor))
            }
        };
        let id = Uuid::new_v4();
        let shared = Arc::new(SubscriberShared::default());
        self.subscribers.push(Subscriber {
            id,
            sender,
            evictor,
            shared: Arc::clone(&shared),
        });
        info!(
            "event=subscriber_add module=notify status=ok subscription_id={} policy={:?} subscribers={}",
            id,
            policy,
            self.subscribers.len()
        );
        Subscription {
            id,
            receiver,
            shared,
        }
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        let removed = self.subscribers.len() < before;
        if removed {
            info!(
                "event=subscriber_remove module=notify status=ok subscription_id={} subscribers={}",
                id,
                self.subscribers.len()
            );
        }
        removed
    }

    /// Sends `snapshot` to every live subscriber and prunes dead ones.
    pub(crate) fn publish(&mut self, snapshot: &Snapshot) {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|subscriber| subscriber.is_connected() && subscriber.deliver(snapshot));
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            info!(
                "event=subscriber_pruned module=notify status=ok pruned={} subscribers={}",
                pruned,
                self.subscribers.len()
            );
        }
        debug!(
            "event=snapshot_publish module=notify status=ok version={} persons={} subscribers={}",
            snapshot.version(),
            snapshot.len(),
            self.subscribers.len()
        );
    }
}
