use std::{future::Future, sync::Arc};

use analytics::Analytics;
use chrono::{DateTime, Duration, TimeZone, Utc};
use maritime_core::{
    AisIngestionInbound, Mmsi, NewPositionReport, VesselStatic, test_helper::MemoryAdapter,
};

pub struct TestHelper {
    pub analytics: Analytics,
    pub storage: MemoryAdapter,
}

pub async fn test<T, Fut>(test_closure: T)
where
    T: FnOnce(TestHelper) -> Fut,
    Fut: Future<Output = ()>,
{
    let storage = MemoryAdapter::new();
    test_closure(TestHelper {
        analytics: Analytics::new(Arc::new(storage.clone())),
        storage,
    })
    .await;
}

impl TestHelper {
    pub async fn add_reports(&self, reports: &[NewPositionReport]) {
        self.storage.add_position_reports(reports).await.unwrap();
    }

    pub async fn name_vessel(&self, mmsi: Mmsi, name: &str) {
        self.storage
            .update_vessel(&VesselStatic {
                mmsi,
                name: Some(name.into()),
                ship_type: None,
            })
            .await
            .unwrap();
    }
}

pub fn mmsi() -> Mmsi {
    Mmsi::try_from(123456789).unwrap()
}

pub fn other_mmsi() -> Mmsi {
    Mmsi::try_from(123456790).unwrap()
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn report(
    mmsi: Mmsi,
    seconds: i64,
    latitude: f64,
    longitude: f64,
    speed: f64,
) -> NewPositionReport {
    NewPositionReport {
        mmsi,
        timestamp: t0() + Duration::seconds(seconds),
        latitude,
        longitude,
        speed,
        course: 0.0,
        heading: Some(0.0),
    }
}

/// Two reports 600 s and roughly 3 nm apart, heading due north.
pub fn three_mile_leg(mmsi: Mmsi) -> Vec<NewPositionReport> {
    vec![
        report(mmsi, 0, 1.0, 1.0, 10.0),
        report(mmsi, 600, 1.05, 1.0, 12.0),
    ]
}
