//! End-to-end coordinator behavior over the scripted mock cloud

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use fluidra_state::{
    DeviceId, DeviceRegistry, PollConfig, PollCoordinator, SemanticRole,
};
use helpers::MockCloud;

fn coordinator(cloud: &Arc<MockCloud>) -> PollCoordinator {
    PollCoordinator::with_config(
        cloud.api(),
        DeviceRegistry::builtin(),
        PollConfig::default().with_water_quality(false),
    )
}

#[tokio::test]
async fn test_one_failing_device_does_not_fail_the_cycle() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[(9, json!(1))]);
    cloud.add_device("D2", "Pump", &[]);
    cloud.add_device("D3", "Pump", &[(9, json!(0))]);
    cloud.fail_components_for("D2");

    let coordinator = coordinator(&cloud);
    let snapshot = coordinator.refresh(false).await.expect("cycle succeeds");

    assert!(!snapshot.stale);
    assert_eq!(snapshot.device_count(), 3);
    assert_eq!(snapshot.available_count(), 2);

    let d1 = snapshot.get_device(&DeviceId::new("D1")).unwrap();
    assert!(d1.available);
    assert!(d1.is_running());

    let d2 = snapshot.get_device(&DeviceId::new("D2")).unwrap();
    assert!(!d2.available);

    let d3 = snapshot.get_device(&DeviceId::new("D3")).unwrap();
    assert!(d3.available);
    assert!(!d3.is_running());
}

#[tokio::test]
async fn test_tree_failure_retains_stale_snapshot() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[(9, json!(1))]);

    let coordinator = coordinator(&cloud);
    let first = coordinator.refresh(false).await.unwrap();
    assert_eq!(first.cycle, 1);
    assert!(!first.stale);

    cloud.set_fail_tree(true);
    let err = coordinator.refresh(true).await.unwrap_err();
    assert!(!err.is_auth_expired());

    // Previous data survives, flagged stale, cycle number unchanged
    let retained = coordinator.snapshot();
    assert!(retained.stale);
    assert_eq!(retained.cycle, 1);
    assert_eq!(retained.device_count(), 1);
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_cycle() {
    let cloud = MockCloud::with_latency(Duration::from_millis(20));
    cloud.add_device("D1", "Pump", &[(9, json!(1))]);

    let coordinator = coordinator(&cloud);
    let (a, b) = tokio::join!(coordinator.refresh(false), coordinator.refresh(false));

    let a = a.unwrap();
    let b = b.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cloud.tree_fetches(), 1);
}

#[tokio::test]
async fn test_forced_refresh_supersedes_scheduled_cycle() {
    let cloud = MockCloud::with_latency(Duration::from_millis(10));
    cloud.add_device("D1", "Pump", &[(9, json!(1))]);

    let coordinator = coordinator(&cloud);
    let (scheduled, forced) =
        tokio::join!(coordinator.refresh(false), coordinator.refresh(true));

    assert!(scheduled.is_ok());
    assert!(forced.is_ok());
    // Both cycles ran, and publication never went backwards
    assert_eq!(cloud.tree_fetches(), 2);
    assert_eq!(coordinator.snapshot().cycle, 2);
}

#[tokio::test]
async fn test_command_applies_optimistic_state_and_holds_scheduled_cycles() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[(9, json!(1)), (10, json!(0))]);

    let coordinator = coordinator(&cloud);
    coordinator.refresh(false).await.unwrap();
    assert!(coordinator
        .snapshot()
        .get_device(&DeviceId::new("D1"))
        .unwrap()
        .is_running());

    let fetches_before = cloud.tree_fetches();
    coordinator
        .issue_command(&DeviceId::new("D1"), 9, json!(0))
        .await
        .unwrap();

    // Optimistic state is visible immediately, without a cycle
    let optimistic = coordinator.snapshot();
    let d1 = optimistic.get_device(&DeviceId::new("D1")).unwrap();
    assert!(!d1.is_running());
    assert_eq!(cloud.tree_fetches(), fetches_before);

    // Scheduled cycles are held off while the hold is active
    let held = coordinator.refresh(false).await.unwrap();
    assert!(Arc::ptr_eq(&held, &coordinator.snapshot()));
    assert_eq!(cloud.tree_fetches(), fetches_before);

    // Forced reconcile runs a real cycle and confirms the written value
    let reconciled = coordinator.reconcile().await.unwrap();
    assert_eq!(cloud.tree_fetches(), fetches_before + 1);
    let d1 = reconciled.get_device(&DeviceId::new("D1")).unwrap();
    assert!(d1.available);
    assert!(!d1.is_running());

    // Hold is cleared; scheduled cycles run again
    coordinator.refresh(false).await.unwrap();
    assert_eq!(cloud.tree_fetches(), fetches_before + 2);
}

#[tokio::test]
async fn test_auth_expiry_surfaces_for_reauthentication() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[]);
    cloud.set_reject_auth(true);

    let coordinator = coordinator(&cloud);
    let err = coordinator.refresh(false).await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(coordinator.snapshot().stale);
}

#[tokio::test]
async fn test_chlorinator_capabilities_end_to_end() {
    let cloud = MockCloud::new();
    cloud.add_device(
        "CC24033907",
        "Chlorinator",
        &[
            (10, json!(60)),
            (16, json!(720)),
            (172, json!(710)),
            (177, json!(779)),
        ],
    );

    let coordinator = coordinator(&cloud);
    let snapshot = coordinator.refresh(false).await.unwrap();

    let unit = snapshot.get_device(&DeviceId::new("CC24033907")).unwrap();
    assert_eq!(unit.profile, "cc24033907_chlorinator");
    assert_eq!(
        unit.capability(SemanticRole::Ph).and_then(|v| v.as_f64()),
        Some(7.1)
    );
    assert_eq!(
        unit.capability(SemanticRole::Orp).and_then(|v| v.as_f64()),
        Some(779.0)
    );
    assert_eq!(
        unit.capability(SemanticRole::ChlorinationLevel)
            .and_then(|v| v.as_f64()),
        Some(60.0)
    );
}

#[tokio::test]
async fn test_periodic_driver_runs_and_stops() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[]);

    let coordinator = Arc::new(PollCoordinator::with_config(
        cloud.api(),
        DeviceRegistry::builtin(),
        PollConfig::default()
            .with_water_quality(false)
            .with_update_interval(Duration::from_millis(30)),
    ));

    let driver = Arc::clone(&coordinator).start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(cloud.tree_fetches() >= 2);

    coordinator.shutdown();
    driver.await.unwrap();
    assert!(!coordinator.snapshot().is_empty());
}

#[tokio::test]
async fn test_water_quality_enrichment() {
    let cloud = MockCloud::new();
    cloud.add_device("D1", "Pump", &[]);

    let coordinator = PollCoordinator::with_config(
        cloud.api(),
        DeviceRegistry::builtin(),
        PollConfig::default(),
    );
    let snapshot = coordinator.refresh(false).await.unwrap();
    let quality = snapshot.water_quality.as_ref().expect("telemetry fetched");
    assert_eq!(quality["items"][0]["ph"], json!(7.2));
}
