use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use async_trait::async_trait;
use maritime_core::OutboundEvent;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use crate::{
    engine::PositionSink,
    error::{Result, error::SinkClosedSnafu},
};

/// Messages between two statistics log lines.
const STATS_LOG_INTERVAL: u64 = 100;

pub type ConsumerId = u64;

/// Fan-out of emitted events to every connected consumer.
///
/// Each consumer owns a bounded queue, a consumer that falls behind or goes
/// away is dropped from the registry without affecting anyone else.
pub struct Publisher {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    queue_size: usize,
    sent: AtomicU64,
    started: Instant,
}

#[derive(Default)]
struct Registry {
    consumers: HashMap<ConsumerId, mpsc::Sender<Arc<str>>>,
    /// Set by [`Publisher::shutdown`], no consumer is registered afterwards.
    closed: bool,
}

impl Publisher {
    pub fn new(queue_size: usize) -> Publisher {
        Publisher {
            registry: Mutex::new(Registry::default()),
            next_id: AtomicU64::new(0),
            queue_size: queue_size.max(1),
            sent: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Registers a consumer. It only receives events broadcast after this
    /// call. After [`Self::shutdown`] the returned queue is already closed.
    pub fn subscribe(&self) -> (ConsumerId, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(self.queue_size);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut registry = self.registry();
        if registry.closed {
            warn!(consumer = id, "publisher is shut down, refusing consumer");
        } else {
            registry.consumers.insert(id, tx);
            info!(consumer = id, "consumer connected");
        }

        (id, rx)
    }

    pub fn unsubscribe(&self, id: ConsumerId) {
        if self.registry().consumers.remove(&id).is_some() {
            info!(consumer = id, "consumer disconnected");
        }
    }

    pub fn num_consumers(&self) -> usize {
        self.registry().consumers.len()
    }

    pub fn is_closed(&self) -> bool {
        self.registry().closed
    }

    /// Sends `event` to every registered consumer and returns how many
    /// accepted it. Delivery failures are logged and never propagated.
    pub fn broadcast(&self, event: &OutboundEvent) -> usize {
        let message: Arc<str> = event.to_json().into();

        let mut delivered = 0;
        let mut registry = self.registry();
        registry.consumers.retain(|id, tx| match tx.try_send(message.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(consumer = id, "consumer queue is full, disconnecting it");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(consumer = id, "consumer went away");
                false
            }
        });
        let num_consumers = registry.consumers.len();
        drop(registry);

        let sent = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        if sent % STATS_LOG_INTERVAL == 0 {
            let runtime = self.started.elapsed().as_secs_f64();
            info!(
                messages = sent,
                runtime_secs = runtime,
                messages_per_sec = sent as f64 / runtime.max(f64::EPSILON),
                consumers = num_consumers,
                "publisher statistics"
            );
        }

        delivered
    }

    /// Drops every consumer handle and refuses new ones. Connection writers
    /// flush what is already queued and then close.
    pub fn shutdown(&self) {
        let mut registry = self.registry();
        registry.closed = true;
        let closed = registry.consumers.len();
        registry.consumers.clear();
        info!(closed, "publisher shut down");
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl PositionSink for Publisher {
    async fn emit(&self, event: OutboundEvent) -> Result<()> {
        if self.is_closed() {
            return SinkClosedSnafu.fail();
        }
        self.broadcast(&event);
        Ok(())
    }
}
