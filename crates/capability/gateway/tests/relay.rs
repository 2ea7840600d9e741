mod support;

use domain::{DutyClass, SwitchState};
use smaas_protocol::RelayState;
use smaas_storage::{RelayPortStore, RelayPortUpdate};
use support::Harness;

#[tokio::test]
async fn device_create_provisions_six_ports() {
    let harness = Harness::new().await;
    let ports = harness
        .store
        .list_relay_ports("dev-1", 0, 0)
        .await
        .expect("list");
    let slots: Vec<(DutyClass, u8)> = ports.iter().map(|port| (port.duty, port.port)).collect();
    assert_eq!(
        slots,
        vec![
            (DutyClass::LowDuty, 1),
            (DutyClass::LowDuty, 2),
            (DutyClass::LowDuty, 3),
            (DutyClass::LowDuty, 4),
            (DutyClass::HeavyDuty, 1),
            (DutyClass::HeavyDuty, 2),
        ]
    );
    assert!(ports.iter().all(|port| !port.state));
    assert_eq!(ports[2].label, "Relay 3");
    assert_eq!(ports[4].fixture_id(), "relayheavyduty1");
}

#[tokio::test]
async fn device_report_updates_state_without_echo() {
    let harness = Harness::new().await;
    harness
        .inbound_message(
            "arduino/dev-1/relay",
            &RelayState {
                duty: DutyClass::HeavyDuty,
                port: 2,
                state: SwitchState::On,
            },
        )
        .await;

    let binding = harness
        .store
        .find_relay_port_by_slot("dev-1", DutyClass::HeavyDuty, 2)
        .await
        .expect("find")
        .expect("binding");
    assert!(binding.state);
    assert!(harness.publisher.on("arduino/dev-1/relay").is_empty());
    assert!(!harness.gateway.suppressor().is_suppressed("dev-1"));
}

#[tokio::test]
async fn operator_update_is_published() {
    let harness = Harness::new().await;
    let binding = harness
        .store
        .find_relay_port_by_slot("dev-1", DutyClass::LowDuty, 3)
        .await
        .expect("find")
        .expect("binding");
    harness
        .store
        .update_relay_port(&binding.binding_id, RelayPortUpdate::state(true))
        .await
        .expect("update");

    let sent: Vec<RelayState> = harness.publisher.decoded("arduino/dev-1/relay");
    assert_eq!(
        sent,
        vec![RelayState {
            duty: DutyClass::LowDuty,
            port: 3,
            state: SwitchState::On,
        }]
    );
}

#[tokio::test]
async fn suppression_is_scoped_to_reporting_device() {
    let harness = Harness::new().await;
    harness.add_device("dev-2").await;
    let other = harness
        .store
        .find_relay_port_by_slot("dev-2", DutyClass::LowDuty, 1)
        .await
        .expect("find")
        .expect("binding");

    let _guard = harness.gateway.suppressor().suppress("dev-1");
    harness
        .store
        .update_relay_port(&other.binding_id, RelayPortUpdate::state(true))
        .await
        .expect("update");
    assert_eq!(harness.publisher.on("arduino/dev-2/relay").len(), 1);
}

#[tokio::test]
async fn report_for_unknown_port_changes_nothing() {
    let harness = Harness::new().await;
    harness
        .inbound_message(
            "arduino/dev-1/relay",
            &RelayState {
                duty: DutyClass::HeavyDuty,
                port: 4,
                state: SwitchState::On,
            },
        )
        .await;
    harness.inbound("arduino/dev-1/relay", vec![3, 1, 0]).await;

    let ports = harness
        .store
        .list_relay_ports("dev-1", 0, 0)
        .await
        .expect("list");
    assert!(ports.iter().all(|port| !port.state));
    assert!(harness.publisher.sent().is_empty());
}

#[tokio::test]
async fn full_resync_publishes_every_port() {
    let harness = Harness::new().await;
    let binding = harness
        .store
        .find_relay_port_by_slot("dev-1", DutyClass::LowDuty, 2)
        .await
        .expect("find")
        .expect("binding");
    harness
        .store
        .update_relay_port(&binding.binding_id, RelayPortUpdate::state(true))
        .await
        .expect("update");
    harness.publisher.clear();

    harness.inbound("arduino/dev-1/relay/full", Vec::new()).await;

    let sent: Vec<RelayState> = harness.publisher.decoded("arduino/dev-1/relay");
    assert_eq!(sent.len(), 6);
    assert_eq!(sent.iter().filter(|state| state.state.is_on()).count(), 1);
    assert!(!harness.gateway.suppressor().is_suppressed("dev-1"));
}

#[tokio::test]
async fn resync_pages_through_every_port() {
    for page_size in [4, 3, 1] {
        let harness = Harness::with_settings(smaas_gateway::GatewaySettings {
            resync_page_size: page_size,
            resync_delay: std::time::Duration::from_millis(1),
            ..Default::default()
        })
        .await;
        let published = harness.gateway.relay().resync("dev-1").await.expect("resync");
        assert_eq!(published, 6, "page size {}", page_size);

        let sent: Vec<RelayState> = harness.publisher.decoded("arduino/dev-1/relay");
        let slots: Vec<(DutyClass, u8)> =
            sent.iter().map(|state| (state.duty, state.port)).collect();
        assert_eq!(
            slots,
            vec![
                (DutyClass::LowDuty, 1),
                (DutyClass::LowDuty, 2),
                (DutyClass::LowDuty, 3),
                (DutyClass::LowDuty, 4),
                (DutyClass::HeavyDuty, 1),
                (DutyClass::HeavyDuty, 2),
            ]
        );
    }
}

#[tokio::test]
async fn resync_of_device_without_ports_publishes_nothing() {
    let harness = Harness::new().await;
    let published = harness.gateway.relay().resync("dev-9").await.expect("resync");
    assert_eq!(published, 0);
    assert!(harness.publisher.sent().is_empty());
}
