use chrono::Duration;

use crate::helper::*;

#[tokio::test]
async fn test_active_vessels_within_window() {
    test(|helper| async move {
        let now = t0() + Duration::minutes(10);
        let window = Duration::minutes(5);

        helper.add_reports(&[report(mmsi(), 0, 1.0, 1.0, 10.0)]).await;
        let active = helper
            .analytics
            .list_active_vessels_at(now, window)
            .await
            .unwrap();
        assert!(active.is_empty());

        helper
            .add_reports(&[report(mmsi(), 8 * 60, 1.01, 1.0, 10.0)])
            .await;
        let active = helper
            .analytics
            .list_active_vessels_at(now, window)
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].vessel.mmsi, mmsi());
        assert_eq!(active[0].latest.latitude, 1.01);
    })
    .await;
}

#[tokio::test]
async fn test_active_vessel_tie_is_broken_by_ingestion_order() {
    test(|helper| async move {
        helper.add_reports(&[report(mmsi(), 0, 1.0, 1.0, 10.0)]).await;
        helper.add_reports(&[report(mmsi(), 0, 1.2, 1.0, 10.0)]).await;

        let active = helper
            .analytics
            .list_active_vessels_at(t0(), Duration::minutes(5))
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].latest.latitude, 1.2);
    })
    .await;
}

#[tokio::test]
async fn test_negative_window_is_rejected() {
    test(|helper| async move {
        assert!(
            helper
                .analytics
                .list_active_vessels_at(t0(), Duration::minutes(-1))
                .await
                .is_err()
        );
    })
    .await;
}

#[tokio::test]
async fn test_window_reaching_past_supported_dates_covers_all_history() {
    test(|helper| async move {
        helper.add_reports(&[report(mmsi(), 0, 1.0, 1.0, 10.0)]).await;

        let active = helper
            .analytics
            .list_active_vessels(Duration::days(365 * 300_000))
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
    })
    .await;
}
