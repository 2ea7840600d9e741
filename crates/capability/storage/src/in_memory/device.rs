//! 设备存储实现（删除级联到全部从属记录）

use super::{InMemoryRecordStore, Tables};
use crate::error::StorageError;
use crate::hooks::RecordSnapshot;
use crate::models::DeviceRecord;
use crate::traits::{ConfigRecordStore, CredentialStore, DeviceStore, SensorConfigStore};

#[async_trait::async_trait]
impl DeviceStore for InMemoryRecordStore {
    async fn create_device(&self, record: DeviceRecord) -> Result<DeviceRecord, StorageError> {
        if record.device_id.is_empty() {
            return Err(StorageError::invalid("device_id required"));
        }
        {
            let mut tables = self.write()?;
            if tables.devices.contains_key(&record.device_id) {
                return Err(StorageError::conflict("device exists"));
            }
            tables
                .devices
                .insert(record.device_id.clone(), record.clone());
        }
        self.hooks
            .after_create(&RecordSnapshot::Device(record.clone()))
            .await?;
        Ok(record)
    }

    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let tables = self.read()?;
        Ok(tables.devices.get(device_id).cloned())
    }

    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, StorageError> {
        let tables = self.read()?;
        let mut items: Vec<DeviceRecord> = tables.devices.values().cloned().collect();
        items.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        Ok(items)
    }

    async fn delete_device(&self, device_id: &str) -> Result<bool, StorageError> {
        let Some(device) = self.find_device(device_id).await? else {
            return Ok(false);
        };
        let snapshot = RecordSnapshot::Device(device);
        self.hooks.before_delete(&snapshot).await?;

        // 标记与收集在同一把写锁内完成，之后新建的从属记录会被 ensure_device 拒绝
        let dependents = {
            let mut tables = self.write()?;
            if !tables.devices.contains_key(device_id)
                || !tables.deleting.insert(device_id.to_string())
            {
                return Ok(false);
            }
            Dependents::collect(&tables, device_id)
        };

        let cascade = self.delete_dependents(device_id, dependents).await;

        {
            let mut tables = self.write()?;
            tables.deleting.remove(device_id);
            if cascade.is_ok() {
                tables.readings.retain(|item| item.device_id != device_id);
                tables.access_logs.retain(|item| item.device_id != device_id);
                tables.devices.remove(device_id);
            }
        }
        cascade?;
        self.hooks.after_delete(&snapshot).await?;
        Ok(true)
    }
}

/// 设备名下待级联删除的记录 id
struct Dependents {
    sensor_ids: Vec<String>,
    port_ids: Vec<String>,
    credential_ids: Vec<String>,
}

impl Dependents {
    fn collect(tables: &Tables, device_id: &str) -> Self {
        Self {
            sensor_ids: tables
                .sensor_configs
                .values()
                .filter(|item| item.device_id == device_id)
                .map(|item| item.config_id.clone())
                .collect(),
            port_ids: tables
                .relay_ports
                .values()
                .filter(|item| item.device_id == device_id)
                .map(|item| item.binding_id.clone())
                .collect(),
            credential_ids: tables
                .credentials
                .values()
                .filter(|item| item.device_id == device_id)
                .map(|item| item.credential_id.clone())
                .collect(),
        }
    }
}

impl InMemoryRecordStore {
    async fn delete_dependents(
        &self,
        device_id: &str,
        dependents: Dependents,
    ) -> Result<(), StorageError> {
        // 传感器先于配置记录删除，撤回报文逐条发出且不重复
        for config_id in dependents.sensor_ids {
            self.delete_sensor_config(&config_id).await?;
        }
        for binding_id in dependents.port_ids {
            self.remove_relay_port(&binding_id).await?;
        }
        for credential_id in dependents.credential_ids {
            self.delete_credential(&credential_id).await?;
        }
        self.delete_config_record(device_id).await?;
        Ok(())
    }
}
