//! 网关装配
//!
//! 内存记录存储 + MQTT 发布器 + 网关组件 + MQTT 接入源。
//! 接入源返回即视为连接中断，进程随之退出。
//!
//! 内存存储只用于开发和单机联调：进程重启即丢失全部记录，
//! 启动时按 `SMAAS_SEED_DEVICES` 写入设备，由设备创建钩子补齐继电器端口。

use smaas_config::AppConfig;
use smaas_control::{MqttPublisher, MqttPublisherConfig, qos_from_u8};
use smaas_gateway::{Gateway, GatewaySettings};
use smaas_ingest::{MqttSource, MqttSourceConfig, Source};
use smaas_storage::{DeviceRecord, DeviceStore, InMemoryRecordStore, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub fn settings_from(config: &AppConfig) -> GatewaySettings {
    GatewaySettings {
        root_topic: config.mqtt_root_topic.clone(),
        max_payload_bytes: config.max_payload_bytes,
        per_kind_config_topics: config.config_per_kind_topics,
        resync_delay: Duration::from_millis(config.relay_resync_delay_ms),
        resync_page_size: config.relay_resync_page_size,
    }
}

/// 写入种子设备，已存在的设备跳过，返回新建数量。
pub async fn seed_devices(
    store: &dyn DeviceStore,
    device_ids: &[String],
) -> Result<usize, StorageError> {
    let mut created = 0;
    for device_id in device_ids {
        if store.find_device(device_id).await?.is_some() {
            continue;
        }
        store
            .create_device(DeviceRecord {
                device_id: device_id.clone(),
                account_id: String::new(),
                name: device_id.clone(),
                status: "seeded".to_string(),
            })
            .await?;
        created += 1;
    }
    Ok(created)
}

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryRecordStore::new());
    let (publisher, publish_loop) = MqttPublisher::connect(MqttPublisherConfig {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        username: config.mqtt_username.clone(),
        password: config.mqtt_password.clone(),
        qos: config.mqtt_publish_qos,
    })?;

    let gateway = Gateway::new(store.clone(), Arc::new(publisher), settings_from(config));
    gateway.register_hooks();
    let seeded = seed_devices(store.as_ref(), &config.seed_devices).await?;
    info!(target: "smaas.gateway", seeded, "devices_seeded");
    let router = Arc::new(gateway.router());

    let source = MqttSource::new(MqttSourceConfig {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        username: config.mqtt_username.clone(),
        password: config.mqtt_password.clone(),
        subscriptions: gateway.subscriptions(),
        qos: qos_from_u8(config.mqtt_subscribe_qos),
    });
    info!(
        target: "smaas.gateway",
        subscriptions = ?source.config().subscriptions,
        "gateway_listening"
    );

    let result = source.run(router).await;
    publish_loop.abort();
    if let Err(err) = &result {
        warn!(target: "smaas.gateway", error = %err, "mqtt_source_stopped");
    }
    result.map_err(Into::into)
}
