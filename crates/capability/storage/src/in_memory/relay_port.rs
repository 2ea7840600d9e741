//! 继电器端口存储实现

use super::{InMemoryRecordStore, apply_page};
use crate::error::StorageError;
use crate::hooks::RecordSnapshot;
use crate::models::{RelayPortBinding, RelayPortUpdate};
use crate::traits::RelayPortStore;
use crate::validation::ensure_relay_port_in_range;
use domain::DutyClass;

impl InMemoryRecordStore {
    /// 删除端口绑定（仅随设备级联删除）
    pub(super) async fn remove_relay_port(&self, binding_id: &str) -> Result<bool, StorageError> {
        let Some(record) = self.find_relay_port(binding_id).await? else {
            return Ok(false);
        };
        let snapshot = RecordSnapshot::RelayPort(record);
        self.hooks.before_delete(&snapshot).await?;
        let removed = {
            let mut tables = self.write()?;
            tables.relay_ports.remove(binding_id).is_some()
        };
        // 并发删除时只有实际移除记录的一方触发删除后钩子
        if !removed {
            return Ok(false);
        }
        self.hooks.after_delete(&snapshot).await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl RelayPortStore for InMemoryRecordStore {
    async fn create_relay_port(
        &self,
        record: RelayPortBinding,
    ) -> Result<RelayPortBinding, StorageError> {
        ensure_relay_port_in_range(record.duty, record.port)?;
        {
            let mut tables = self.write()?;
            Self::ensure_device(&tables, &record.device_id)?;
            let taken = tables.relay_ports.values().any(|item| {
                item.device_id == record.device_id
                    && item.duty == record.duty
                    && item.port == record.port
            });
            if taken || tables.relay_ports.contains_key(&record.binding_id) {
                return Err(StorageError::conflict(format!(
                    "{} relay port {} already bound",
                    record.duty, record.port
                )));
            }
            tables
                .relay_ports
                .insert(record.binding_id.clone(), record.clone());
        }
        self.hooks
            .after_create(&RecordSnapshot::RelayPort(record.clone()))
            .await?;
        Ok(record)
    }

    async fn find_relay_port(
        &self,
        binding_id: &str,
    ) -> Result<Option<RelayPortBinding>, StorageError> {
        let tables = self.read()?;
        Ok(tables.relay_ports.get(binding_id).cloned())
    }

    async fn find_relay_port_by_slot(
        &self,
        device_id: &str,
        duty: DutyClass,
        port: u8,
    ) -> Result<Option<RelayPortBinding>, StorageError> {
        let tables = self.read()?;
        let item = tables
            .relay_ports
            .values()
            .find(|item| item.device_id == device_id && item.duty == duty && item.port == port)
            .cloned();
        Ok(item)
    }

    async fn list_relay_ports(
        &self,
        device_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RelayPortBinding>, StorageError> {
        let tables = self.read()?;
        let mut items: Vec<RelayPortBinding> = tables
            .relay_ports
            .values()
            .filter(|item| item.device_id == device_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.duty.code(), item.port));
        apply_page(&mut items, offset, limit);
        Ok(items)
    }

    async fn update_relay_port(
        &self,
        binding_id: &str,
        update: RelayPortUpdate,
    ) -> Result<Option<RelayPortBinding>, StorageError> {
        let (previous, current) = {
            let mut tables = self.write()?;
            let Some(item) = tables.relay_ports.get_mut(binding_id) else {
                return Ok(None);
            };
            let previous = item.clone();
            if let Some(state) = update.state {
                item.state = state;
            }
            if let Some(label) = update.label {
                item.label = label;
            }
            (previous, item.clone())
        };
        self.hooks
            .after_update(
                &RecordSnapshot::RelayPort(previous),
                &RecordSnapshot::RelayPort(current.clone()),
            )
            .await?;
        Ok(Some(current))
    }
}
