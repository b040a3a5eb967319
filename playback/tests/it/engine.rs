use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use maritime_core::{Coordinates, Mmsi, Notice, ValidationError, geo::distance_nm};
use playback::{
    engine::PlaybackEngine,
    error::Error,
    vessel::Navigation,
};
use tokio::time::Instant;

use crate::helper::{FailingSink, FixedRoutes, free_running, route, start_time, test};

#[tokio::test(start_paused = true)]
async fn test_set_speed_doubles_simulated_delta_but_not_cadence() {
    test(|mut helper| async move {
        helper.engine.add_vessel(free_running(1)).await.unwrap();
        helper.drain();

        helper.engine.start(Duration::from_secs(1), 1.0).await.unwrap();

        let first = helper.next_position().await;
        let first_wall = Instant::now();
        let second = helper.next_position().await;
        let second_wall = Instant::now();

        assert_eq!(second.timestamp - first.timestamp, chrono::Duration::seconds(1));
        assert_eq!(second_wall - first_wall, Duration::from_secs(1));

        helper.engine.set_speed(2.0).await.unwrap();
        assert_eq!(helper.next_notice().await, Notice::SpeedUpdated { speed: 2.0 });

        let third = helper.next_position().await;
        let third_wall = Instant::now();
        let fourth = helper.next_position().await;
        let fourth_wall = Instant::now();

        assert_eq!(fourth.timestamp - third.timestamp, chrono::Duration::seconds(2));
        assert_eq!(fourth_wall - third_wall, Duration::from_secs(1));
    })
    .await;
}

#[tokio::test]
async fn test_add_vessel_emits_notice_and_initial_report() {
    test(|mut helper| async move {
        let vessel = free_running(123456789);
        assert!(helper.engine.add_vessel(vessel.clone()).await.unwrap());

        match helper.next_notice().await {
            Notice::VesselAdded { mmsi, .. } => assert_eq!(mmsi, vessel.mmsi),
            other => panic!("unexpected notice: {other:?}"),
        }

        let initial = helper.next_position().await;
        assert_eq!(initial.mmsi, vessel.mmsi);
        assert_eq!(initial.timestamp, start_time());
        assert_eq!(initial.decoded.latitude, 1.0);
        assert_eq!(initial.decoded.speed, 10.0);
    })
    .await;
}

#[tokio::test]
async fn test_duplicate_vessel_is_a_no_op() {
    test(|mut helper| async move {
        assert!(helper.engine.add_vessel(free_running(5)).await.unwrap());
        helper.drain();

        let mut other = free_running(5);
        other.speed = 20.0;
        assert!(!helper.engine.add_vessel(other).await.unwrap());
        assert!(!helper.engine.spawn_vessel(Mmsi::test_new(5), 20.0).await.unwrap());

        assert!(helper.drain().is_empty());
        let vessels = helper.engine.vessels().await;
        assert_eq!(vessels.len(), 1);
        assert_eq!(vessels[0].speed, 10.0);
    })
    .await;
}

#[tokio::test]
async fn test_spawned_vessel_starts_at_first_waypoint() {
    test(|mut helper| async move {
        assert!(helper
            .engine
            .spawn_vessel(Mmsi::test_new(123456790), 17.0)
            .await
            .unwrap());

        match helper.next_notice().await {
            Notice::VesselAdded {
                start_port,
                end_port,
                ..
            } => {
                assert_eq!(start_port.as_deref(), Some("Oslo"));
                assert_eq!(end_port.as_deref(), Some("Gothenburg"));
            }
            other => panic!("unexpected notice: {other:?}"),
        }

        let initial = helper.next_position().await;
        assert_eq!(initial.decoded.latitude, route()[0].latitude);
        assert_eq!(initial.decoded.longitude, route()[0].longitude);
        assert_eq!(initial.decoded.speed, 17.0);
        assert!((initial.decoded.course - 90.0).abs() < 1.0);
    })
    .await;
}

#[tokio::test]
async fn test_spawn_vessel_requires_positive_speed() {
    test(|mut helper| async move {
        for speed in [0.0, -1.0, f64::NAN] {
            let err = helper
                .engine
                .spawn_vessel(Mmsi::test_new(1), speed)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                Error::Validation {
                    source: ValidationError::InvalidSpeed { .. },
                    ..
                }
            ));
        }
        assert!(helper.drain().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_tick_moves_vessels_by_speed_times_interval() {
    test(|mut helper| async move {
        let mut vessel = free_running(1);
        vessel.speed = 3600.0;
        helper.engine.add_vessel(vessel).await.unwrap();
        helper.drain();

        helper.engine.tick().await;

        let position = helper.next_position().await;
        let moved = distance_nm(
            &Coordinates::new(1.0, 1.0),
            &Coordinates::new(position.decoded.latitude, position.decoded.longitude),
        );
        // One simulated second at 3600 knots
        assert!((moved - 1.0).abs() < 0.01, "{moved}");
        assert_eq!(position.timestamp - start_time(), chrono::Duration::seconds(1));
    })
    .await;
}

#[tokio::test]
async fn test_one_report_per_vessel_per_tick() {
    test(|mut helper| async move {
        for i in 1..=3 {
            helper.engine.add_vessel(free_running(i)).await.unwrap();
        }
        helper.drain();

        helper.engine.tick().await;

        let events = helper.drain();
        assert_eq!(events.len(), 3);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_no_reports_after_stop() {
    test(|mut helper| async move {
        helper.engine.add_vessel(free_running(1)).await.unwrap();
        helper.engine.start(Duration::from_secs(1), 1.0).await.unwrap();
        helper.next_position().await;
        helper.next_position().await;

        helper.engine.stop().await;
        assert!(!helper.engine.is_running().await);
        helper.drain();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(helper.drain().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_invalid_start_and_speed_arguments_are_rejected() {
    test(|helper| async move {
        assert!(helper.engine.start(Duration::ZERO, 1.0).await.is_err());
        assert!(helper.engine.start(Duration::from_secs(1), -1.0).await.is_err());

        helper.engine.start(Duration::from_secs(1), 1.0).await.unwrap();
        assert!(matches!(
            helper.engine.start(Duration::from_secs(1), 1.0).await,
            Err(Error::AlreadyRunning { .. })
        ));

        assert!(helper.engine.set_speed(0.0).await.is_err());
        assert!(helper.engine.set_speed(f64::INFINITY).await.is_err());
        assert_eq!(helper.engine.speed_factor().await, 1.0);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_emission_failures_do_not_halt_the_loop() {
    let sink = Arc::new(FailingSink::default());
    let engine = PlaybackEngine::with_clock(
        sink.clone(),
        Arc::new(FixedRoutes(route())),
        Navigation::default(),
        start_time(),
    );

    engine.add_vessel(free_running(1)).await.unwrap();
    engine.start(Duration::from_secs(1), 1.0).await.unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    engine.stop().await;

    // vessel_added + initial report + three ticks
    assert_eq!(sink.0.load(Ordering::SeqCst), 5);
    assert_eq!(engine.clock().await - start_time(), chrono::Duration::seconds(3));
}
