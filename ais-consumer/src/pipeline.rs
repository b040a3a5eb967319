use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use maritime_core::{
    IngestionStorage, Mmsi, NewPositionReport, ReportKey, RetryPolicy, ValidationError,
    VesselStatic, retry,
};
use snafu::ResultExt;
use tokio::sync::MutexGuard;
use tracing::{debug, info, instrument, warn};

use crate::{
    counters::QualityCounters,
    error::{
        Result,
        error::{BatchCommitSnafu, StorageSnafu},
    },
};

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Received messages between two counter log lines.
const COUNTERS_LOG_INTERVAL: u64 = 100;

/// Outcome of a single [`Ingestor::ingest`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingested {
    /// Accepted and waiting in the buffer.
    Buffered,
    /// Accepted, and it filled the buffer which was then committed.
    Committed(usize),
    /// Identical to an already accepted report, dropped.
    Duplicate,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Invalid(ValidationError),
    /// Older than the last accepted report of the same vessel.
    Stale {
        timestamp: DateTime<Utc>,
        last_accepted: DateTime<Utc>,
    },
}

/// Validates, deduplicates and batches position reports before committing
/// them to storage.
///
/// `ingest` may be called concurrently. The buffer and per-vessel history
/// sit behind a lock that is never held across storage calls, and commits are
/// serialized so reports of a vessel reach storage in timestamp order.
pub struct Ingestor {
    storage: Arc<dyn IngestionStorage>,
    counters: Arc<QualityCounters>,
    batch_size: usize,
    retry: RetryPolicy,
    state: Mutex<PipelineState>,
    commit: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct PipelineState {
    buffer: VecDeque<NewPositionReport>,
    vessels: HashMap<Mmsi, VesselHistory>,
}

/// Last accepted timestamp of a vessel and the identities of the accepted
/// reports sharing that millisecond.
struct VesselHistory {
    last_accepted: DateTime<Utc>,
    keys: HashSet<ReportKey>,
}

enum Check {
    Accept,
    Duplicate,
    Stale(DateTime<Utc>),
}

impl Ingestor {
    pub fn new(
        storage: Arc<dyn IngestionStorage>,
        counters: Arc<QualityCounters>,
        batch_size: usize,
        retry: RetryPolicy,
    ) -> Ingestor {
        Ingestor {
            storage,
            counters,
            batch_size: batch_size.max(1),
            retry,
            state: Mutex::new(PipelineState::default()),
            commit: tokio::sync::Mutex::new(()),
        }
    }

    pub fn counters(&self) -> &Arc<QualityCounters> {
        &self.counters
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of accepted reports not yet committed.
    pub fn pending(&self) -> usize {
        self.state().buffer.len()
    }

    /// Seeds the per-vessel history from storage so stale and duplicate
    /// detection survive a restart.
    #[instrument(skip_all, fields(app.num_vessels))]
    pub async fn restore(&self) -> Result<()> {
        let latest = self
            .storage
            .latest_position_reports()
            .await
            .context(StorageSnafu)?;

        tracing::Span::current().record("app.num_vessels", latest.len());

        let mut state = self.state();
        for report in latest {
            let key = report.key();
            state
                .vessels
                .entry(report.mmsi)
                .or_insert_with(|| VesselHistory::new(report.timestamp))
                .record(report.timestamp, key);
        }

        Ok(())
    }

    /// Validates, deduplicates and buffers one report. Rejections are
    /// returned as values, only a failed batch commit is an error, and the
    /// batch then stays buffered.
    pub async fn ingest(&self, report: NewPositionReport) -> Result<Ingested> {
        let received = self.counters.add_received();
        if received % COUNTERS_LOG_INTERVAL == 0 {
            self.log_counters();
        }

        if let Err(e) = report.validate() {
            self.counters.add_invalid();
            debug!(mmsi = %report.mmsi, "rejected invalid report: {e}");
            return Ok(Ingested::Rejected(Rejection::Invalid(e)));
        }

        let buffered = {
            let mut state = self.state();
            match state.check(&report) {
                Check::Duplicate => {
                    self.counters.add_duplicate();
                    return Ok(Ingested::Duplicate);
                }
                Check::Stale(last_accepted) => {
                    self.counters.add_stale();
                    debug!(mmsi = %report.mmsi, %last_accepted, timestamp = %report.timestamp, "rejected stale report");
                    return Ok(Ingested::Rejected(Rejection::Stale {
                        timestamp: report.timestamp,
                        last_accepted,
                    }));
                }
                Check::Accept => {
                    state.accept(report);
                    self.counters.add_accepted();
                    state.buffer.len()
                }
            }
        };

        if buffered < self.batch_size {
            return Ok(Ingested::Buffered);
        }

        // A running commit keeps draining the buffer, the timed flush picks
        // up whatever it leaves behind.
        match self.commit.try_lock() {
            Ok(guard) => Ok(Ingested::Committed(self.flush_locked(guard).await?)),
            Err(_) => Ok(Ingested::Buffered),
        }
    }

    /// Records a report that could not even be decoded.
    pub fn reject_unreadable(&self, error: &ValidationError) {
        let received = self.counters.add_received();
        self.counters.add_invalid();
        debug!("rejected unreadable message: {error}");
        if received % COUNTERS_LOG_INTERVAL == 0 {
            self.log_counters();
        }
    }

    /// Commits everything currently buffered, one batch at a time, and
    /// returns the number of committed reports.
    pub async fn flush(&self) -> Result<usize> {
        let guard = self.commit.lock().await;
        self.flush_locked(guard).await
    }

    #[instrument(skip_all, fields(app.num_reports))]
    async fn flush_locked(&self, _commit: MutexGuard<'_, ()>) -> Result<usize> {
        let mut committed = 0;
        loop {
            let batch: Vec<_> = {
                let mut state = self.state();
                let n = state.buffer.len().min(self.batch_size);
                state.buffer.drain(..n).collect()
            };

            if batch.is_empty() {
                break;
            }

            if let Err(e) = retry(self.retry, || self.storage.add_position_reports(&batch)).await {
                let size = batch.len();
                let mut state = self.state();
                for report in batch.into_iter().rev() {
                    state.buffer.push_front(report);
                }
                warn!(size, pending = state.buffer.len(), "batch commit failed, keeping batch");
                tracing::Span::current().record("app.num_reports", committed);
                return Err(e).context(BatchCommitSnafu { size });
            }

            committed += batch.len();
        }

        tracing::Span::current().record("app.num_reports", committed);
        Ok(committed)
    }

    /// Enriches the stored vessel identity.
    pub async fn update_vessel(&self, vessel: &VesselStatic) -> Result<()> {
        self.storage
            .update_vessel(vessel)
            .await
            .context(StorageSnafu)
    }

    pub fn log_counters(&self) {
        let c = self.counters.snapshot();
        info!(
            received = c.received,
            accepted = c.accepted,
            rejected_invalid = c.rejected_invalid,
            rejected_stale = c.rejected_stale,
            rejected_duplicate = c.rejected_duplicate,
            pending = self.pending(),
            "ingestion counters"
        );
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PipelineState {
    fn check(&self, report: &NewPositionReport) -> Check {
        let Some(history) = self.vessels.get(&report.mmsi) else {
            return Check::Accept;
        };

        if history.keys.contains(&report.key()) {
            Check::Duplicate
        } else if report.timestamp < history.last_accepted {
            Check::Stale(history.last_accepted)
        } else {
            Check::Accept
        }
    }

    fn accept(&mut self, report: NewPositionReport) {
        let key = report.key();
        self.vessels
            .entry(report.mmsi)
            .or_insert_with(|| VesselHistory::new(report.timestamp))
            .record(report.timestamp, key);
        self.buffer.push_back(report);
    }
}

impl VesselHistory {
    fn new(timestamp: DateTime<Utc>) -> VesselHistory {
        VesselHistory {
            last_accepted: timestamp,
            keys: HashSet::new(),
        }
    }

    fn record(&mut self, timestamp: DateTime<Utc>, key: ReportKey) {
        if timestamp.timestamp_millis() > self.last_accepted.timestamp_millis() {
            self.keys.clear();
        }
        if timestamp > self.last_accepted {
            self.last_accepted = timestamp;
        }
        self.keys.insert(key);
    }
}
