//! In-memory storage used by tests across the workspace.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use snafu::IntoError;

use crate::{
    ActiveVessel, AisIngestionInbound, AisIngestionOutbound, AnalyticsOutbound, CoreResult, Error,
    Mmsi, NewPositionReport, PositionReport, QueryRange, ReportKey, Vessel, VesselStatic,
    core_error::StorageSnafu,
};

#[derive(Debug)]
struct InjectedFailure;

impl std::fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("injected storage failure")
    }
}

impl std::error::Error for InjectedFailure {}

fn injected_failure() -> Error {
    StorageSnafu.into_error(Box::new(InjectedFailure))
}

#[derive(Default)]
struct MemoryStore {
    vessels: BTreeMap<Mmsi, Vessel>,
    reports: Vec<PositionReport>,
    keys: HashSet<(Mmsi, ReportKey)>,
    next_sequence: i64,
    fail_next_commits: u32,
    fail_after_writes: Option<usize>,
    commits: u32,
}

/// Lock-per-operation store with the same ordering and atomicity guarantees
/// as the postgres adapter, plus fault injection.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    inner: Arc<Mutex<MemoryStore>>,
}

impl MemoryAdapter {
    pub fn new() -> MemoryAdapter {
        MemoryAdapter::default()
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next `n` batch commits fail before writing anything.
    pub fn fail_next_commits(&self, n: u32) {
        self.store().fail_next_commits = n;
    }

    /// The next batch commit fails after `n` reports have been staged.
    pub fn fail_after_writes(&self, n: usize) {
        self.store().fail_after_writes = Some(n);
    }

    /// Number of successful batch commits.
    pub fn commits(&self) -> u32 {
        self.store().commits
    }

    pub fn all_position_reports_sync(&self) -> Vec<PositionReport> {
        let mut reports = self.store().reports.clone();
        reports.sort_by_key(|r| (r.timestamp, r.sequence));
        reports
    }

    pub fn all_vessels(&self) -> Vec<Vessel> {
        self.store().vessels.values().cloned().collect()
    }

    fn filtered(&self, filter: impl Fn(&PositionReport) -> bool) -> Vec<PositionReport> {
        let store = self.store();
        let mut reports: Vec<_> = store.reports.iter().filter(|r| filter(r)).cloned().collect();
        reports.sort_by_key(|r| (r.timestamp, r.sequence));
        reports
    }
}

#[async_trait]
impl AisIngestionInbound for MemoryAdapter {
    async fn add_position_reports(&self, reports: &[NewPositionReport]) -> CoreResult<()> {
        let mut store = self.store();

        if store.fail_next_commits > 0 {
            store.fail_next_commits -= 1;
            return Err(injected_failure());
        }

        let fail_after = store.fail_after_writes.take();
        let mut staged = Vec::with_capacity(reports.len());
        let mut staged_keys = HashSet::with_capacity(reports.len());
        let mut sequence = store.next_sequence;

        for (i, r) in reports.iter().enumerate() {
            if fail_after == Some(i) {
                return Err(injected_failure());
            }
            let key = (r.mmsi, r.key());
            if store.keys.contains(&key) || !staged_keys.insert(key) {
                continue;
            }
            sequence += 1;
            staged.push(r.clone().with_sequence(sequence));
        }

        for r in &staged {
            store
                .vessels
                .entry(r.mmsi)
                .or_insert_with(|| Vessel::new(r.mmsi));
        }
        store.keys.extend(staged_keys);
        store.reports.extend(staged);
        store.next_sequence = sequence;
        store.commits += 1;

        Ok(())
    }

    async fn update_vessel(&self, vessel: &VesselStatic) -> CoreResult<()> {
        self.store()
            .vessels
            .entry(vessel.mmsi)
            .or_insert_with(|| Vessel::new(vessel.mmsi))
            .enrich(vessel);
        Ok(())
    }
}

#[async_trait]
impl AisIngestionOutbound for MemoryAdapter {
    async fn latest_position_reports(&self) -> CoreResult<Vec<PositionReport>> {
        Ok(self
            .active_vessels(DateTime::<Utc>::MIN_UTC)
            .await?
            .into_iter()
            .map(|v| v.latest)
            .collect())
    }
}

#[async_trait]
impl AnalyticsOutbound for MemoryAdapter {
    async fn active_vessels(&self, since: DateTime<Utc>) -> CoreResult<Vec<ActiveVessel>> {
        let store = self.store();

        let mut latest: BTreeMap<Mmsi, &PositionReport> = BTreeMap::new();
        for r in &store.reports {
            let entry = latest.entry(r.mmsi).or_insert(r);
            if (r.timestamp, r.sequence) > (entry.timestamp, entry.sequence) {
                *entry = r;
            }
        }

        Ok(latest
            .into_values()
            .filter(|r| r.timestamp >= since)
            .map(|r| ActiveVessel {
                vessel: store
                    .vessels
                    .get(&r.mmsi)
                    .cloned()
                    .unwrap_or_else(|| Vessel::new(r.mmsi)),
                latest: r.clone(),
            })
            .collect())
    }

    async fn position_reports(
        &self,
        mmsi: Mmsi,
        range: &QueryRange,
    ) -> CoreResult<Vec<PositionReport>> {
        Ok(self.filtered(|r| r.mmsi == mmsi && range.contains(r.timestamp)))
    }

    async fn all_position_reports(&self, range: &QueryRange) -> CoreResult<Vec<PositionReport>> {
        Ok(self.filtered(|r| range.contains(r.timestamp)))
    }

    async fn vessel(&self, mmsi: Mmsi) -> CoreResult<Option<Vessel>> {
        Ok(self.store().vessels.get(&mmsi).cloned())
    }
}
