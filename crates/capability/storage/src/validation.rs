//! 验证辅助函数
//!
//! 写入前的一致性校验：
//! - ensure_sensor_unique：传感器 ID 与占用端口在 (设备, 种类) 内唯一
//! - ensure_relay_port_in_range：端口号落在夹具的端口范围内
//!
//! 冲突以 `StorageErrorKind::Conflict` 返回，由写入方直接看到。

use crate::error::StorageError;
use crate::models::SensorConfigRecord;
use domain::DutyClass;

/// 校验传感器配置的唯一性
///
/// `existing` 可以包含候选记录自身（更新场景），按 `config_id` 排除。
pub fn ensure_sensor_unique<'a>(
    existing: impl IntoIterator<Item = &'a SensorConfigRecord>,
    candidate: &SensorConfigRecord,
) -> Result<(), StorageError> {
    let kind = candidate.kind();
    let ports = candidate.settings.occupied_ports();
    for other in existing {
        if other.config_id == candidate.config_id
            || other.device_id != candidate.device_id
            || other.kind() != kind
        {
            continue;
        }
        if other.sensor_id == candidate.sensor_id {
            return Err(StorageError::conflict(format!(
                "{} sensor_id {} already exists",
                kind, candidate.sensor_id
            )));
        }
        let taken = other.settings.occupied_ports();
        if let Some(port) = ports.iter().find(|port| taken.contains(port)) {
            return Err(StorageError::conflict(format!(
                "{} port {} already in use by sensor_id {}",
                kind, port, other.sensor_id
            )));
        }
    }
    Ok(())
}

/// 校验继电器端口范围
pub fn ensure_relay_port_in_range(duty: DutyClass, port: u8) -> Result<(), StorageError> {
    if !duty.contains_port(port) {
        return Err(StorageError::invalid(format!(
            "port {} out of range for {} relay (1-{})",
            port,
            duty,
            duty.port_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SensorSettings;

    fn light(device: &str, sensor_id: u32, port: u8) -> SensorConfigRecord {
        SensorConfigRecord::new(device, sensor_id, "ldr", SensorSettings::Light { port })
    }

    #[test]
    fn other_device_or_kind_does_not_conflict() {
        let existing = vec![
            light("dev-2", 1, 3),
            SensorConfigRecord::new(
                "dev-1",
                1,
                "motion",
                SensorSettings::Motion {
                    port: 3,
                    relay_type: 1,
                    relay_port: 1,
                },
            ),
        ];
        assert!(ensure_sensor_unique(&existing, &light("dev-1", 1, 3)).is_ok());
    }

    #[test]
    fn climate_ports_conflict_across_fields() {
        let existing = vec![SensorConfigRecord::new(
            "dev-1",
            1,
            "climate",
            SensorSettings::Climate {
                dht22_port: 2,
                aqi_port: 14,
                has_buzzer: false,
                buzzer_port: None,
            },
        )];
        let candidate = SensorConfigRecord::new(
            "dev-1",
            2,
            "climate",
            SensorSettings::Climate {
                dht22_port: 14,
                aqi_port: 15,
                has_buzzer: false,
                buzzer_port: None,
            },
        );
        let err = ensure_sensor_unique(&existing, &candidate).expect_err("conflict");
        assert!(err.is_conflict());
    }

    #[test]
    fn buzzer_port_ignored_without_buzzer() {
        let existing = vec![SensorConfigRecord::new(
            "dev-1",
            1,
            "climate",
            SensorSettings::Climate {
                dht22_port: 2,
                aqi_port: 14,
                has_buzzer: false,
                buzzer_port: Some(8),
            },
        )];
        let candidate = SensorConfigRecord::new(
            "dev-1",
            2,
            "climate",
            SensorSettings::Climate {
                dht22_port: 3,
                aqi_port: 15,
                has_buzzer: true,
                buzzer_port: Some(8),
            },
        );
        assert!(ensure_sensor_unique(&existing, &candidate).is_ok());
    }

    #[test]
    fn relay_port_range_follows_duty() {
        assert!(ensure_relay_port_in_range(DutyClass::LowDuty, 4).is_ok());
        assert!(ensure_relay_port_in_range(DutyClass::HeavyDuty, 3).is_err());
    }
}
