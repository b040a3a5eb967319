use std::{convert::Infallible, sync::Arc, time::Duration};

use ais_consumer::{
    consumer::Consumer,
    counters::{QualityCounters, QualitySnapshot},
    pipeline::Ingestor,
    settings::Settings,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::Future;
use maritime_core::{
    AisIngestionInbound, AisIngestionOutbound, CoreResult, Environment, LogFormat, Mmsi,
    NewPositionReport, OutboundEvent, PositionEvent, PositionReport, RetryPolicy, VesselStatic,
    test_helper::MemoryAdapter,
};
use postgres::{PsqlLogStatements, PsqlSettings};
use tokio::{
    sync::{Semaphore, mpsc},
    task::JoinHandle,
};
use tokio_stream::wrappers::ReceiverStream;

pub const FLUSH_INTERVAL: Duration = Duration::from_millis(50);

pub struct TestHelper {
    pub ingestor: Arc<Ingestor>,
    pub counters: Arc<QualityCounters>,
    pub storage: MemoryAdapter,
}

/// A consumer reading from an in-process channel instead of a websocket.
pub struct FeedHelper {
    pub helper: TestHelper,
    pub feed: Option<mpsc::Sender<Result<String, Infallible>>>,
    pub consumer: JoinHandle<ais_consumer::error::Result<()>>,
}

pub async fn test<T, Fut>(test_closure: T)
where
    T: FnOnce(TestHelper) -> Fut,
    Fut: Future<Output = ()>,
{
    test_closure(build_helper(MemoryAdapter::new()).await).await;
}

pub async fn test_with_feed<T, Fut>(test_closure: T)
where
    T: FnOnce(FeedHelper) -> Fut,
    Fut: Future<Output = ()>,
{
    let helper = build_helper(MemoryAdapter::new()).await;
    let (tx, rx) = mpsc::channel(100);

    let consumer = Consumer::new(helper.ingestor.clone(), FLUSH_INTERVAL);
    let consumer = tokio::spawn(async move { consumer.run(ReceiverStream::new(rx)).await });

    test_closure(FeedHelper {
        helper,
        feed: Some(tx),
        consumer,
    })
    .await;
}

pub async fn build_helper(storage: MemoryAdapter) -> TestHelper {
    let counters = Arc::new(QualityCounters::new());
    let ingestor = Arc::new(Ingestor::new(
        Arc::new(storage.clone()),
        counters.clone(),
        10,
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        },
    ));
    ingestor.restore().await.unwrap();

    TestHelper {
        ingestor,
        counters,
        storage,
    }
}

pub fn test_settings(feed_url: String) -> Settings {
    Settings {
        postgres: PsqlSettings {
            ip: "127.0.0.1".into(),
            port: 5432,
            db_name: None,
            username: "postgres".into(),
            password: "test".into(),
            max_connections: 1,
            root_cert: None,
            log_statements: PsqlLogStatements::Disable,
        },
        environment: Environment::Test,
        log_format: LogFormat::Pretty,
        feed_url,
        reconnect_delay: Duration::from_millis(50),
        batch_size: 10,
        flush_interval: FLUSH_INTERVAL,
        commit_retry: RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        },
    }
}

pub fn mmsi() -> Mmsi {
    "123456789".parse().unwrap()
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn report(mmsi: Mmsi, seconds: i64) -> NewPositionReport {
    NewPositionReport {
        mmsi,
        timestamp: t0() + chrono::Duration::seconds(seconds),
        latitude: 1.0 + seconds as f64 * 1e-4,
        longitude: 1.0,
        speed: 10.0,
        course: 0.0,
        heading: Some(0.0),
    }
}

/// Polls `condition` until it holds or five seconds have passed.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within five seconds"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

impl TestHelper {
    pub fn counters(&self) -> QualitySnapshot {
        self.counters.snapshot()
    }

    pub fn stored(&self) -> Vec<NewPositionReport> {
        self.storage
            .all_position_reports_sync()
            .into_iter()
            .map(NewPositionReport::from)
            .collect()
    }
}

impl FeedHelper {
    pub async fn send_report(&self, report: &NewPositionReport) {
        let event = OutboundEvent::Position(PositionEvent::from(report));
        self.send_text(event.to_json()).await;
    }

    pub async fn send_event(&self, event: OutboundEvent) {
        self.send_text(event.to_json()).await;
    }

    pub async fn send_text(&self, text: impl Into<String>) {
        self.feed
            .as_ref()
            .unwrap()
            .send(Ok(text.into()))
            .await
            .unwrap();
    }

    /// Ends the feed and waits for the consumer to return.
    pub async fn close_feed(&mut self) -> ais_consumer::error::Result<()> {
        self.feed.take();
        (&mut self.consumer).await.unwrap()
    }
}

/// Storage whose batch commits wait until the gate is opened.
#[derive(Clone)]
pub struct GatedStorage {
    pub inner: MemoryAdapter,
    gate: Arc<Semaphore>,
}

impl GatedStorage {
    pub fn new(inner: MemoryAdapter) -> GatedStorage {
        GatedStorage {
            inner,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(1024);
    }
}

#[async_trait]
impl AisIngestionInbound for GatedStorage {
    async fn add_position_reports(&self, reports: &[NewPositionReport]) -> CoreResult<()> {
        let _permit = self.gate.acquire().await.unwrap();
        self.inner.add_position_reports(reports).await
    }

    async fn update_vessel(&self, vessel: &VesselStatic) -> CoreResult<()> {
        self.inner.update_vessel(vessel).await
    }
}

#[async_trait]
impl AisIngestionOutbound for GatedStorage {
    async fn latest_position_reports(&self) -> CoreResult<Vec<PositionReport>> {
        self.inner.latest_position_reports().await
    }
}
