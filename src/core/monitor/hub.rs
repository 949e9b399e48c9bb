//! Fan-out of monitor events to subscribers.
//!
//! Each subscriber owns a bounded queue. Publishing never waits: a queue that
//! is full or whose receiver is gone counts as a failed delivery, and that
//! subscriber is dropped from the registry on the spot.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

pub use tokio::sync::mpsc::error::TryRecvError;

use super::events::MonitorEvent;

/// Default per-subscriber queue depth.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiving side handed to an observer.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Arc<MonitorEvent>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event. `None` once the hub dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Arc<MonitorEvent>> {
        self.receiver.recv().await
    }

    /// Blocking variant for use outside the async runtime.
    pub fn blocking_recv(&mut self) -> Option<Arc<MonitorEvent>> {
        self.receiver.blocking_recv()
    }

    /// Next queued event without waiting.
    pub fn try_recv(&mut self) -> Result<Arc<MonitorEvent>, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Registry of live subscribers.
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<Arc<MonitorEvent>>>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.lock().insert(id, tx);
        log::debug!("Subscriber {} registered", id);

        Subscription { id, receiver: rx }
    }

    /// Returns false when `id` was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            log::debug!("Subscriber {} unsubscribed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every subscriber and return how many accepted it.
    pub fn publish(&self, event: MonitorEvent) -> usize {
        let event = Arc::new(event);
        let mut subscribers = self.subscribers.lock();
        let mut failed = Vec::new();

        for (id, tx) in subscribers.iter() {
            match tx.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} is not keeping up, dropping it", id);
                    failed.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected", id);
                    failed.push(*id);
                }
            }
        }

        for id in &failed {
            subscribers.remove(id);
        }

        log::trace!(
            "Published {} to {} subscriber(s)",
            event.kind(),
            subscribers.len()
        );
        subscribers.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
