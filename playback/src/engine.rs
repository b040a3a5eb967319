use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maritime_core::{
    Mmsi, Notice, OutboundEvent, PositionEvent,
    validation_error::{InvalidSpeedFactorSnafu, InvalidSpeedSnafu},
};
use snafu::ResultExt;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{
        Result,
        error::{
            AlreadyRunningSnafu, InvalidIntervalSnafu, RoutePlanningSnafu, ValidationSnafu,
        },
    },
    route::RouteProvider,
    vessel::{Navigation, SimulatedVessel},
};

/// Destination of everything the engine emits.
#[async_trait]
pub trait PositionSink: Send + Sync + 'static {
    async fn emit(&self, event: OutboundEvent) -> Result<()>;
}

/// Advances every tracked vessel on a simulated clock and emits one position
/// report per vessel per tick.
///
/// Cloning is cheap and every clone drives the same simulation.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<EngineState>,
    running: Mutex<Option<Running>>,
    sink: Arc<dyn PositionSink>,
    routes: Arc<dyn RouteProvider>,
    navigation: Navigation,
}

struct EngineState {
    vessels: BTreeMap<Mmsi, SimulatedVessel>,
    interval: Duration,
    speed_factor: f64,
    clock: DateTime<Utc>,
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PlaybackEngine {
    pub fn new(
        sink: Arc<dyn PositionSink>,
        routes: Arc<dyn RouteProvider>,
        navigation: Navigation,
    ) -> PlaybackEngine {
        PlaybackEngine::with_clock(sink, routes, navigation, Utc::now())
    }

    /// Starts the simulated clock at `clock` instead of the current time.
    pub fn with_clock(
        sink: Arc<dyn PositionSink>,
        routes: Arc<dyn RouteProvider>,
        navigation: Navigation,
        clock: DateTime<Utc>,
    ) -> PlaybackEngine {
        PlaybackEngine {
            inner: Arc::new(Inner {
                state: Mutex::new(EngineState {
                    vessels: BTreeMap::new(),
                    interval: Duration::from_secs(1),
                    speed_factor: 1.0,
                    clock,
                }),
                running: Mutex::new(None),
                sink,
                routes,
                navigation,
            }),
        }
    }

    /// Emits a tick every `interval` of wall-clock time until [`Self::stop`]
    /// is called.
    pub async fn start(&self, interval: Duration, speed_factor: f64) -> Result<()> {
        if interval.is_zero() {
            return InvalidIntervalSnafu.fail();
        }
        validate_speed_factor(speed_factor)?;

        let mut running = self.inner.running.lock().await;
        if running.is_some() {
            return AlreadyRunningSnafu.fail();
        }

        {
            let mut state = self.inner.state.lock().await;
            state.interval = interval;
            state.speed_factor = speed_factor;
        }

        let cancel = CancellationToken::new();
        let engine = self.clone();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => engine.tick().await,
                }
            }
        });

        info!(?interval, speed_factor, "playback started");
        *running = Some(Running { cancel, handle });

        Ok(())
    }

    /// Halts emission. Once this returns no further reports are emitted and
    /// no tick is left half done.
    pub async fn stop(&self) {
        let running = self.inner.running.lock().await.take();
        if let Some(Running { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!("playback loop did not exit cleanly: {e:?}");
            }
            info!("playback stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.inner.running.lock().await.is_some()
    }

    /// Advances all vessels by one interval of simulated time and emits a
    /// report for each of them.
    #[instrument(skip_all, fields(app.num_vessels))]
    pub async fn tick(&self) {
        let mut state = self.inner.state.lock().await;

        let elapsed_secs = state.interval.as_secs_f64() * state.speed_factor;
        state.clock += chrono::Duration::milliseconds((elapsed_secs * 1000.0).round() as i64);

        let clock = state.clock;
        let hours = elapsed_secs / 3600.0;
        let navigation = self.inner.navigation;

        tracing::Span::current().record("app.num_vessels", state.vessels.len());

        for vessel in state.vessels.values_mut() {
            vessel.advance(hours, &navigation);
            let event = OutboundEvent::Position(PositionEvent::from(&vessel.report(clock)));
            self.emit(event).await;
        }
    }

    /// Registers a vessel and immediately emits its initial report. Returns
    /// `false` without side effects if the vessel is already tracked.
    #[instrument(skip_all, fields(app.mmsi = %vessel.mmsi))]
    pub async fn add_vessel(&self, vessel: SimulatedVessel) -> Result<bool> {
        if !(vessel.speed.is_finite() && vessel.speed >= 0.0) {
            return InvalidSpeedSnafu {
                value: vessel.speed,
            }
            .fail()
            .context(ValidationSnafu);
        }

        let mut state = self.inner.state.lock().await;
        if state.vessels.contains_key(&vessel.mmsi) {
            debug!("vessel is already tracked");
            return Ok(false);
        }

        let notice = Notice::VesselAdded {
            mmsi: vessel.mmsi,
            name: vessel.name.clone(),
            start_port: vessel.origin.clone(),
            end_port: vessel.destination.clone(),
        };
        let initial = OutboundEvent::Position(PositionEvent::from(&vessel.report(state.clock)));

        info!(speed = vessel.speed, origin = ?vessel.origin, destination = ?vessel.destination, "vessel added");
        state.vessels.insert(vessel.mmsi, vessel);

        self.emit(OutboundEvent::Notice(notice)).await;
        self.emit(initial).await;

        Ok(true)
    }

    /// Adds a vessel travelling along a route from the route provider.
    /// The speed must be positive.
    pub async fn spawn_vessel(&self, mmsi: Mmsi, speed: f64) -> Result<bool> {
        if !(speed.is_finite() && speed > 0.0) {
            return InvalidSpeedSnafu { value: speed }
                .fail()
                .context(ValidationSnafu);
        }

        if self.inner.state.lock().await.vessels.contains_key(&mmsi) {
            debug!(%mmsi, "vessel is already tracked");
            return Ok(false);
        }

        let route = self.inner.routes.plan(mmsi)?;
        let Some(mut vessel) = SimulatedVessel::on_route(mmsi, speed, route.waypoints) else {
            return RoutePlanningSnafu {
                mmsi,
                reason: "route has no waypoints",
            }
            .fail();
        };
        vessel.origin = route.origin;
        vessel.destination = route.destination;

        self.add_vessel(vessel).await
    }

    /// Changes the global speed factor, the wall-clock cadence is untouched.
    pub async fn set_speed(&self, speed_factor: f64) -> Result<()> {
        validate_speed_factor(speed_factor)?;

        self.inner.state.lock().await.speed_factor = speed_factor;
        info!(speed_factor, "speed factor updated");

        self.emit(OutboundEvent::Notice(Notice::SpeedUpdated {
            speed: speed_factor,
        }))
        .await;

        Ok(())
    }

    pub async fn speed_factor(&self) -> f64 {
        self.inner.state.lock().await.speed_factor
    }

    pub async fn clock(&self) -> DateTime<Utc> {
        self.inner.state.lock().await.clock
    }

    pub async fn vessels(&self) -> Vec<SimulatedVessel> {
        self.inner
            .state
            .lock()
            .await
            .vessels
            .values()
            .cloned()
            .collect()
    }

    async fn emit(&self, event: OutboundEvent) {
        if let Err(e) = self.inner.sink.emit(event).await {
            warn!("failed to emit event: {e:?}");
        }
    }
}

fn validate_speed_factor(speed_factor: f64) -> Result<()> {
    if speed_factor.is_finite() && speed_factor > 0.0 {
        Ok(())
    } else {
        InvalidSpeedFactorSnafu {
            value: speed_factor,
        }
        .fail()
        .context(ValidationSnafu)
    }
}
