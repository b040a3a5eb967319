use ais_consumer::error::Error;
use maritime_core::{Notice, OutboundEvent};

use crate::helper::{mmsi, report, test_with_feed, wait_for};

#[tokio::test]
async fn test_partial_batch_is_flushed_by_timer() {
    test_with_feed(|helper| async move {
        for i in 0..3 {
            helper.send_report(&report(mmsi(), i)).await;
        }

        wait_for(|| helper.helper.storage.all_position_reports_sync().len() == 3).await;
        assert_eq!(helper.helper.counters().accepted, 3);
    })
    .await;
}

#[tokio::test]
async fn test_vessel_added_notice_enriches_vessel() {
    test_with_feed(|helper| async move {
        helper
            .send_event(OutboundEvent::Notice(Notice::VesselAdded {
                mmsi: mmsi(),
                name: Some("Nordkapp".into()),
                start_port: Some("Oslo".into()),
                end_port: None,
            }))
            .await;
        helper.send_report(&report(mmsi(), 0)).await;

        wait_for(|| {
            helper
                .helper
                .storage
                .all_vessels()
                .iter()
                .any(|v| v.mmsi == mmsi() && v.name.as_deref() == Some("Nordkapp"))
        })
        .await;

        // A later notice without a name keeps the stored one
        helper
            .send_event(OutboundEvent::Notice(Notice::VesselAdded {
                mmsi: mmsi(),
                name: None,
                start_port: None,
                end_port: None,
            }))
            .await;
        helper
            .send_event(OutboundEvent::Notice(Notice::SpeedUpdated { speed: 2.0 }))
            .await;

        wait_for(|| helper.helper.storage.all_position_reports_sync().len() == 1).await;
        let vessels = helper.helper.storage.all_vessels();
        assert_eq!(vessels.len(), 1);
        assert_eq!(vessels[0].name.as_deref(), Some("Nordkapp"));
    })
    .await;
}

#[tokio::test]
async fn test_unreadable_messages_are_counted_as_invalid() {
    test_with_feed(|helper| async move {
        helper.send_text("not json").await;
        helper.send_text(r#"{"type":"vessel_sunk","mmsi":"123456789"}"#).await;
        helper
            .send_text(r#"{"message":"AIVDM","mmsi":"1234","timestamp":"2025-01-01T00:00:00Z"}"#)
            .await;

        wait_for(|| helper.helper.counters().received == 3).await;
        let c = helper.helper.counters();
        assert_eq!(c.rejected_invalid, 3);
        assert_eq!(c.accepted, 0);
    })
    .await;
}

#[tokio::test]
async fn test_closed_feed_flushes_and_reports_closure() {
    test_with_feed(|mut helper| async move {
        helper.send_report(&report(mmsi(), 0)).await;
        helper.send_report(&report(mmsi(), 1)).await;

        let result = helper.close_feed().await;

        assert!(matches!(result, Err(Error::StreamClosed { .. })));
        assert_eq!(helper.helper.storage.all_position_reports_sync().len(), 2);
        assert_eq!(helper.helper.ingestor.pending(), 0);
    })
    .await;
}
