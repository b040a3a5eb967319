use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::Future;
use maritime_core::{Coordinates, Environment, LogFormat, Mmsi, Notice, OutboundEvent, PositionEvent};
use playback::{
    engine::{PlaybackEngine, PositionSink},
    error::{Result, error::SinkClosedSnafu},
    route::{FinalWaypoint, PlannedRoute, RouteProvider},
    settings::Settings,
    vessel::{Navigation, SimulatedVessel},
};
use tokio::sync::mpsc;

pub struct TestHelper {
    pub engine: PlaybackEngine,
    pub events: mpsc::UnboundedReceiver<OutboundEvent>,
}

pub struct ChannelSink(mpsc::UnboundedSender<OutboundEvent>);

/// Fails every emission but counts the attempts.
#[derive(Default)]
pub struct FailingSink(pub AtomicUsize);

/// Hands every vessel the same route.
pub struct FixedRoutes(pub Vec<Coordinates>);

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn route() -> Vec<Coordinates> {
    vec![
        Coordinates::new(59.0, 10.0),
        Coordinates::new(59.0, 11.0),
        Coordinates::new(60.0, 11.0),
    ]
}

pub fn free_running(mmsi: u32) -> SimulatedVessel {
    SimulatedVessel::free_running(Mmsi::test_new(mmsi), Coordinates::new(1.0, 1.0), 10.0, 0.0)
}

pub async fn test<T, Fut>(test_closure: T)
where
    T: FnOnce(TestHelper) -> Fut,
    Fut: Future<Output = ()>,
{
    let (tx, events) = mpsc::unbounded_channel();
    let engine = PlaybackEngine::with_clock(
        Arc::new(ChannelSink(tx)),
        Arc::new(FixedRoutes(route())),
        Navigation {
            arrival_tolerance_nm: 0.5,
            final_waypoint: FinalWaypoint::Stop,
        },
        start_time(),
    );

    let helper = TestHelper {
        engine: engine.clone(),
        events,
    };

    test_closure(helper).await;

    engine.stop().await;
}

pub fn test_settings(vessels: Vec<playback::settings::InitialVessel>) -> Settings {
    Settings {
        environment: Environment::Test,
        log_format: LogFormat::Pretty,
        host: "127.0.0.1".into(),
        port: 0,
        message_interval: Duration::from_millis(50),
        speed_factor: 1.0,
        consumer_queue_size: 1024,
        arrival_tolerance_nm: 0.5,
        final_waypoint: FinalWaypoint::Stop,
        vessels,
    }
}

impl TestHelper {
    pub async fn next_event(&mut self) -> OutboundEvent {
        self.events.recv().await.unwrap()
    }

    pub async fn next_position(&mut self) -> PositionEvent {
        loop {
            if let OutboundEvent::Position(p) = self.next_event().await {
                return p;
            }
        }
    }

    pub async fn next_notice(&mut self) -> Notice {
        match self.next_event().await {
            OutboundEvent::Notice(n) => n,
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        while let Ok(e) = self.events.try_recv() {
            out.push(e);
        }
        out
    }
}

#[async_trait]
impl PositionSink for ChannelSink {
    async fn emit(&self, event: OutboundEvent) -> Result<()> {
        self.0.send(event).map_err(|_| SinkClosedSnafu.build())
    }
}

#[async_trait]
impl PositionSink for FailingSink {
    async fn emit(&self, _event: OutboundEvent) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        SinkClosedSnafu.fail()
    }
}

impl RouteProvider for FixedRoutes {
    fn plan(&self, _mmsi: Mmsi) -> Result<PlannedRoute> {
        Ok(PlannedRoute {
            origin: Some("Oslo".into()),
            destination: Some("Gothenburg".into()),
            waypoints: self.0.clone(),
        })
    }
}
