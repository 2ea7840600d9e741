mod support;

use domain::{DutyClass, SensorKind};
use smaas_gateway::GatewaySettings;
use smaas_protocol::{ConfigPush, ConfigRemoval, LightConfig, MotionConfig, SensorSnapshot};
use smaas_storage::{
    ConfigRecordStore, DeviceStore, SensorConfigRecord, SensorConfigStore, SensorConfigUpdate,
    SensorSettings,
};
use std::time::Duration;
use support::Harness;

fn light(sensor_id: u32, port: u8) -> SensorConfigRecord {
    SensorConfigRecord::new("dev-1", sensor_id, "ldr", SensorSettings::Light { port })
}

#[tokio::test]
async fn create_then_update_pushes_versioned_snapshots() {
    let harness = Harness::new().await;
    let record = harness
        .store
        .create_sensor_config(light(4, 3))
        .await
        .expect("create");
    harness
        .store
        .update_sensor_config(
            &record.config_id,
            SensorConfigUpdate {
                label: None,
                settings: Some(SensorSettings::Light { port: 6 }),
            },
        )
        .await
        .expect("update");

    let pushes: Vec<ConfigPush> = harness.publisher.decoded("arduino/dev-1/config");
    assert_eq!(
        pushes,
        vec![
            ConfigPush {
                version: 1,
                sensor: SensorSnapshot::Light(LightConfig {
                    sensor_id: 4,
                    port: 3
                }),
            },
            ConfigPush {
                version: 2,
                sensor: SensorSnapshot::Light(LightConfig {
                    sensor_id: 4,
                    port: 6
                }),
            },
        ]
    );
}

#[tokio::test]
async fn delete_publishes_one_removal() {
    let harness = Harness::new().await;
    let record = harness
        .store
        .create_sensor_config(light(4, 3))
        .await
        .expect("create");
    harness.publisher.clear();

    assert!(
        harness
            .store
            .delete_sensor_config(&record.config_id)
            .await
            .expect("delete")
    );

    let removals: Vec<ConfigRemoval> = harness.publisher.decoded("arduino/dev-1/config/remove");
    assert_eq!(removals, vec![ConfigRemoval::Light { sensor_id: 4 }]);
    assert_eq!(harness.publisher.sent().len(), 1);
    let version = harness
        .store
        .find_config_record("dev-1")
        .await
        .expect("find")
        .expect("record")
        .version;
    assert_eq!(version, 2);
}

#[tokio::test]
async fn concurrent_deletes_publish_one_removal() {
    let harness = Harness::new().await;
    harness.stall_deletes(2);
    let record = harness
        .store
        .create_sensor_config(light(4, 3))
        .await
        .expect("create");
    harness.publisher.clear();

    let (first, second) = tokio::join!(
        harness.store.delete_sensor_config(&record.config_id),
        harness.store.delete_sensor_config(&record.config_id)
    );
    assert!(first.expect("first") ^ second.expect("second"));
    assert_eq!(harness.publisher.on("arduino/dev-1/config/remove").len(), 1);
}

#[tokio::test]
async fn rejected_duplicate_does_not_push() {
    let harness = Harness::new().await;
    harness
        .store
        .create_sensor_config(light(4, 3))
        .await
        .expect("create");
    let err = harness
        .store
        .create_sensor_config(light(4, 5))
        .await
        .expect_err("duplicate sensor id");
    assert!(err.is_conflict());
    let err = harness
        .store
        .create_sensor_config(light(5, 3))
        .await
        .expect_err("duplicate port");
    assert!(err.is_conflict());
    assert_eq!(harness.publisher.on("arduino/dev-1/config").len(), 1);
}

#[tokio::test]
async fn motion_snapshot_carries_relay_duty() {
    let harness = Harness::new().await;
    harness
        .store
        .create_sensor_config(SensorConfigRecord::new(
            "dev-1",
            2,
            "hall",
            SensorSettings::Motion {
                port: 7,
                relay_type: 1,
                relay_port: 3,
            },
        ))
        .await
        .expect("create");
    let pushes: Vec<ConfigPush> = harness.publisher.decoded("arduino/dev-1/config");
    assert_eq!(
        pushes[0].sensor,
        SensorSnapshot::Motion(MotionConfig {
            sensor_id: 2,
            port: 7,
            relay_duty: DutyClass::LowDuty,
            relay_port: 3,
        })
    );
}

#[tokio::test]
async fn invalid_relay_type_is_logged_not_pushed() {
    let harness = Harness::new().await;
    harness
        .store
        .create_sensor_config(SensorConfigRecord::new(
            "dev-1",
            2,
            "hall",
            SensorSettings::Motion {
                port: 7,
                relay_type: 5,
                relay_port: 3,
            },
        ))
        .await
        .expect("store write still succeeds");
    assert!(harness.publisher.on("arduino/dev-1/config").is_empty());
}

#[tokio::test]
async fn per_kind_topics_split_pushes() {
    let harness = Harness::with_settings(GatewaySettings {
        per_kind_config_topics: true,
        resync_delay: Duration::ZERO,
        ..Default::default()
    })
    .await;
    harness
        .store
        .create_sensor_config(light(1, 3))
        .await
        .expect("create");
    assert_eq!(harness.publisher.on("arduino/dev-1/config/ldr").len(), 1);
    assert!(harness.publisher.on("arduino/dev-1/config").is_empty());
}

#[tokio::test]
async fn config_record_delete_retracts_every_sensor() {
    let harness = Harness::new().await;
    harness
        .store
        .create_sensor_config(light(1, 3))
        .await
        .expect("create");
    harness
        .store
        .create_sensor_config(light(2, 4))
        .await
        .expect("create");
    harness.publisher.clear();

    assert!(
        harness
            .store
            .delete_config_record("dev-1")
            .await
            .expect("delete")
    );
    let removals: Vec<ConfigRemoval> = harness.publisher.decoded("arduino/dev-1/config/remove");
    let mut ids: Vec<u32> = removals.iter().map(|removal| removal.sensor_id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert!(removals.iter().all(|removal| removal.kind() == SensorKind::Light));
}

#[tokio::test]
async fn device_delete_retracts_each_sensor_once() {
    let harness = Harness::new().await;
    harness
        .store
        .create_sensor_config(light(1, 3))
        .await
        .expect("create");
    harness
        .store
        .create_sensor_config(light(2, 4))
        .await
        .expect("create");
    harness.publisher.clear();

    assert!(harness.store.delete_device("dev-1").await.expect("delete"));
    assert_eq!(harness.publisher.on("arduino/dev-1/config/remove").len(), 2);
}
