//! 配置同步
//!
//! 监听传感器配置与配置记录的变更，向所属设备下发或撤回单个传感器的快照：
//!
//! - 传感器配置创建/更新：版本号加一，下发 `ConfigPush`
//! - 传感器配置删除（删除后阶段）：版本号加一，下发 `ConfigRemoval`
//! - 配置记录删除：对设备仍存在的每个传感器下发 `ConfigRemoval`
//!
//! 下发失败只记录日志，不影响存储写入本身。

use crate::context::{GatewayContext, GatewaySettings};
use crate::error::GatewayError;
use async_trait::async_trait;
use domain::DutyClass;
use smaas_protocol::{
    Channel, ClimateConfig, ConfigPush, ConfigRemoval, LightConfig, MotionConfig, SensorSnapshot,
};
use smaas_storage::{
    ConfigRecord, ConfigRecordStore, DeviceStore, RecordKind, RecordObserver, RecordSnapshot,
    SensorConfigRecord, SensorConfigStore, SensorSettings, StorageError, StorageErrorKind,
};
use smaas_telemetry::{record_config_push, record_config_removal};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConfigSynchronizer {
    ctx: Arc<GatewayContext>,
    per_kind_topics: bool,
}

impl ConfigSynchronizer {
    pub fn new(ctx: Arc<GatewayContext>, settings: &GatewaySettings) -> Self {
        Self {
            ctx,
            per_kind_topics: settings.per_kind_config_topics,
        }
    }

    /// 下发单个传感器的配置快照。
    pub async fn push(&self, record: &SensorConfigRecord) -> Result<(), GatewayError> {
        self.ensure_device(&record.device_id).await?;
        let sensor = snapshot_of(record)?;
        let version = self
            .ctx
            .store
            .bump_config_version(&record.device_id)
            .await?
            .version;
        let channel = if self.per_kind_topics {
            Channel::ConfigKind(sensor.kind())
        } else {
            Channel::Config
        };
        let kind = sensor.kind();
        self.ctx
            .publish(&record.device_id, channel, &ConfigPush { version, sensor })
            .await?;
        record_config_push();
        info!(
            target: "smaas.gateway",
            device_id = %record.device_id,
            sensor_id = record.sensor_id,
            kind = %kind,
            version,
            "config_pushed"
        );
        Ok(())
    }

    /// 撤回单个传感器。
    pub async fn retract(&self, record: &SensorConfigRecord) -> Result<(), GatewayError> {
        if record.device_id.is_empty() {
            return Err(GatewayError::NotFound("sensor config without device".to_string()));
        }
        // 版本号失败不阻止撤回；设备级联删除期间设备已不可见
        match self.ctx.store.bump_config_version(&record.device_id).await {
            Ok(_) => {}
            Err(err) if err.kind() == StorageErrorKind::NotFound => debug!(
                target: "smaas.gateway",
                device_id = %record.device_id,
                "config_version_skipped"
            ),
            Err(err) => warn!(
                target: "smaas.gateway",
                device_id = %record.device_id,
                error = %err,
                "config_version_bump_failed"
            ),
        }
        self.publish_removal(&record.device_id, record).await
    }

    /// 配置记录被删除时撤回设备上的全部传感器。
    async fn retract_all(&self, config: &ConfigRecord) -> Result<(), GatewayError> {
        let sensors = self
            .ctx
            .store
            .list_sensor_configs(&config.device_id, None, 0)
            .await?;
        for sensor in &sensors {
            if let Err(err) = self.publish_removal(&config.device_id, sensor).await {
                warn!(
                    target: "smaas.gateway",
                    device_id = %config.device_id,
                    sensor_id = sensor.sensor_id,
                    error = %err,
                    "config_removal_failed"
                );
            }
        }
        Ok(())
    }

    async fn publish_removal(
        &self,
        device_id: &str,
        record: &SensorConfigRecord,
    ) -> Result<(), GatewayError> {
        let removal = ConfigRemoval::new(record.kind(), record.sensor_id);
        self.ctx
            .publish(device_id, Channel::ConfigRemove, &removal)
            .await?;
        record_config_removal();
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            sensor_id = record.sensor_id,
            kind = %record.kind(),
            "config_removed"
        );
        Ok(())
    }

    async fn ensure_device(&self, device_id: &str) -> Result<(), GatewayError> {
        if device_id.is_empty() {
            return Err(GatewayError::NotFound("sensor config without device".to_string()));
        }
        match self.ctx.store.find_device(device_id).await? {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound(format!("device {}", device_id))),
        }
    }
}

/// 由存储记录构造下发快照，负载类型由存储编码映射。
pub fn snapshot_of(record: &SensorConfigRecord) -> Result<SensorSnapshot, GatewayError> {
    let sensor_id = record.sensor_id;
    let snapshot = match &record.settings {
        SensorSettings::Climate {
            dht22_port,
            aqi_port,
            has_buzzer,
            buzzer_port,
        } => SensorSnapshot::Climate(ClimateConfig {
            sensor_id,
            dht22_port: *dht22_port,
            aqi_port: *aqi_port,
            buzzer_port: if *has_buzzer { *buzzer_port } else { None },
        }),
        SensorSettings::Light { port } => SensorSnapshot::Light(LightConfig {
            sensor_id,
            port: *port,
        }),
        SensorSettings::Motion {
            port,
            relay_type,
            relay_port,
        } => SensorSnapshot::Motion(MotionConfig {
            sensor_id,
            port: *port,
            relay_duty: DutyClass::try_from(*relay_type)?,
            relay_port: *relay_port,
        }),
    };
    Ok(snapshot)
}

fn log_failure(phase: &'static str, record: &RecordSnapshot, err: &GatewayError) {
    warn!(
        target: "smaas.gateway",
        phase,
        device_id = %record.device_id(),
        record_id = %record.record_id(),
        error = %err,
        "config_sync_failed"
    );
}

#[async_trait]
impl RecordObserver for ConfigSynchronizer {
    fn name(&self) -> &'static str {
        "config_synchronizer"
    }

    fn kinds(&self) -> &'static [RecordKind] {
        &[RecordKind::SensorConfig, RecordKind::ConfigRecord]
    }

    async fn on_after_create(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        if let RecordSnapshot::SensorConfig(sensor) = record
            && let Err(err) = self.push(sensor).await
        {
            log_failure("after_create", record, &err);
        }
        Ok(())
    }

    async fn on_after_update(
        &self,
        _previous: &RecordSnapshot,
        current: &RecordSnapshot,
    ) -> Result<(), StorageError> {
        if let RecordSnapshot::SensorConfig(sensor) = current
            && let Err(err) = self.push(sensor).await
        {
            log_failure("after_update", current, &err);
        }
        Ok(())
    }

    async fn on_after_delete(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        let result = match record {
            RecordSnapshot::SensorConfig(sensor) => self.retract(sensor).await,
            RecordSnapshot::ConfigRecord(config) => self.retract_all(config).await,
            _ => Ok(()),
        };
        if let Err(err) = result {
            log_failure("after_delete", record, &err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buzzer_port_dropped_without_buzzer() {
        let record = SensorConfigRecord::new(
            "dev-1",
            4,
            "climate",
            SensorSettings::Climate {
                dht22_port: 2,
                aqi_port: 14,
                has_buzzer: false,
                buzzer_port: Some(8),
            },
        );
        let snapshot = snapshot_of(&record).expect("snapshot");
        assert_eq!(
            snapshot,
            SensorSnapshot::Climate(ClimateConfig {
                sensor_id: 4,
                dht22_port: 2,
                aqi_port: 14,
                buzzer_port: None,
            })
        );
    }

    #[test]
    fn motion_relay_type_maps_to_duty() {
        let record = SensorConfigRecord::new(
            "dev-1",
            1,
            "pir",
            SensorSettings::Motion {
                port: 5,
                relay_type: 2,
                relay_port: 1,
            },
        );
        let SensorSnapshot::Motion(config) = snapshot_of(&record).expect("snapshot") else {
            panic!("expected motion snapshot");
        };
        assert_eq!(config.relay_duty, DutyClass::HeavyDuty);
    }

    #[test]
    fn unknown_relay_type_is_rejected() {
        let record = SensorConfigRecord::new(
            "dev-1",
            1,
            "pir",
            SensorSettings::Motion {
                port: 5,
                relay_type: 9,
                relay_port: 1,
            },
        );
        assert!(matches!(
            snapshot_of(&record),
            Err(GatewayError::InvalidDuty(_))
        ));
    }
}
