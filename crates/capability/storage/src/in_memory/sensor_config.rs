//! 传感器配置存储实现
//!
//! 创建与更新都在写锁内完成唯一性校验，冲突的记录不会落库。

use super::{InMemoryRecordStore, apply_limit};
use crate::error::StorageError;
use crate::hooks::RecordSnapshot;
use crate::models::{SensorConfigRecord, SensorConfigUpdate};
use crate::traits::SensorConfigStore;
use crate::validation::ensure_sensor_unique;
use domain::SensorKind;

#[async_trait::async_trait]
impl SensorConfigStore for InMemoryRecordStore {
    async fn create_sensor_config(
        &self,
        record: SensorConfigRecord,
    ) -> Result<SensorConfigRecord, StorageError> {
        {
            let mut tables = self.write()?;
            Self::ensure_device(&tables, &record.device_id)?;
            if tables.sensor_configs.contains_key(&record.config_id) {
                return Err(StorageError::conflict("sensor config exists"));
            }
            ensure_sensor_unique(tables.sensor_configs.values(), &record)?;
            tables
                .sensor_configs
                .insert(record.config_id.clone(), record.clone());
        }
        self.hooks
            .after_create(&RecordSnapshot::SensorConfig(record.clone()))
            .await?;
        Ok(record)
    }

    async fn find_sensor_config(
        &self,
        config_id: &str,
    ) -> Result<Option<SensorConfigRecord>, StorageError> {
        let tables = self.read()?;
        Ok(tables.sensor_configs.get(config_id).cloned())
    }

    async fn list_sensor_configs(
        &self,
        device_id: &str,
        kind: Option<SensorKind>,
        limit: usize,
    ) -> Result<Vec<SensorConfigRecord>, StorageError> {
        let tables = self.read()?;
        let mut items: Vec<SensorConfigRecord> = tables
            .sensor_configs
            .values()
            .filter(|item| item.device_id == device_id)
            .filter(|item| kind.is_none_or(|kind| item.kind() == kind))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.sensor_id.cmp(&a.sensor_id));
        apply_limit(&mut items, limit);
        Ok(items)
    }

    async fn update_sensor_config(
        &self,
        config_id: &str,
        update: SensorConfigUpdate,
    ) -> Result<Option<SensorConfigRecord>, StorageError> {
        let (previous, current) = {
            let mut tables = self.write()?;
            let Some(previous) = tables.sensor_configs.get(config_id).cloned() else {
                return Ok(None);
            };
            let mut current = previous.clone();
            if let Some(label) = update.label {
                current.label = label;
            }
            if let Some(settings) = update.settings {
                if settings.kind() != previous.kind() {
                    return Err(StorageError::invalid(format!(
                        "cannot change sensor kind from {} to {}",
                        previous.kind(),
                        settings.kind()
                    )));
                }
                current.settings = settings;
            }
            ensure_sensor_unique(tables.sensor_configs.values(), &current)?;
            tables
                .sensor_configs
                .insert(config_id.to_string(), current.clone());
            (previous, current)
        };
        self.hooks
            .after_update(
                &RecordSnapshot::SensorConfig(previous),
                &RecordSnapshot::SensorConfig(current.clone()),
            )
            .await?;
        Ok(Some(current))
    }

    async fn delete_sensor_config(&self, config_id: &str) -> Result<bool, StorageError> {
        let Some(record) = self.find_sensor_config(config_id).await? else {
            return Ok(false);
        };
        let snapshot = RecordSnapshot::SensorConfig(record);
        self.hooks.before_delete(&snapshot).await?;
        let removed = {
            let mut tables = self.write()?;
            tables.sensor_configs.remove(config_id).is_some()
        };
        // 并发删除时只有实际移除记录的一方触发删除后钩子
        if !removed {
            return Ok(false);
        }
        self.hooks.after_delete(&snapshot).await?;
        Ok(true)
    }
}
