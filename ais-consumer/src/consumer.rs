use std::{sync::Arc, time::Duration};

use futures::{Stream, StreamExt};
use maritime_core::{Notice, OutboundEvent, VesselStatic};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::{
    error::{Result, error::StreamClosedSnafu},
    pipeline::Ingestor,
};

/// Feeds text frames from the live stream into the ingestion pipeline and
/// flushes partial batches once `flush_interval` has passed.
pub struct Consumer {
    ingestor: Arc<Ingestor>,
    flush_interval: Duration,
    shutdown: CancellationToken,
}

impl Consumer {
    pub fn new(ingestor: Arc<Ingestor>, flush_interval: Duration) -> Consumer {
        Consumer {
            ingestor,
            flush_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Makes [`Self::run`] return `Ok` once `shutdown` is cancelled. A message
    /// that is being processed is always finished first.
    pub fn set_shutdown(&mut self, shutdown: CancellationToken) {
        self.shutdown = shutdown;
    }

    /// Runs until `source` ends or fails, which is always reported as an
    /// error after the buffered reports have been flushed.
    pub async fn run<S, E>(&self, mut source: S) -> Result<()>
    where
        S: Stream<Item = std::result::Result<String, E>> + Unpin,
        E: std::fmt::Debug,
    {
        let mut interval = tokio::time::interval(self.flush_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                message = source.next() => match message {
                    Some(Ok(message)) => self.process_message(&message).await,
                    Some(Err(e)) => {
                        error!("failed to read from position feed: {e:?}");
                        return self.close().await;
                    }
                    None => return self.close().await,
                },
                _ = interval.tick() => {
                    if self.ingestor.pending() > 0 {
                        if let Err(e) = self.ingestor.flush().await {
                            error!("timed flush failed: {e:?}");
                        }
                    }
                }
            }
        }
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self.ingestor.flush().await {
            error!("failed to flush after feed closed: {e:?}");
        }
        StreamClosedSnafu.fail()
    }

    #[instrument(skip_all)]
    async fn process_message(&self, message: &str) {
        let event = match message.parse::<OutboundEvent>() {
            Ok(e) => e,
            Err(e) => {
                self.ingestor.reject_unreadable(&e);
                return;
            }
        };

        match event {
            OutboundEvent::Position(position) => {
                if let Err(e) = self.ingestor.ingest(position.into()).await {
                    error!("failed to ingest position report: {e:?}");
                }
            }
            OutboundEvent::Notice(Notice::VesselAdded { mmsi, name, .. }) => {
                let vessel = VesselStatic {
                    mmsi,
                    name,
                    ship_type: None,
                };
                if let Err(e) = self.ingestor.update_vessel(&vessel).await {
                    warn!(%mmsi, "failed to update vessel: {e:?}");
                }
            }
            OutboundEvent::Notice(Notice::SpeedUpdated { speed }) => {
                debug!(speed, "playback speed changed");
            }
        }
    }
}
