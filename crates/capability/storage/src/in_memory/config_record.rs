use super::InMemoryRecordStore;
use crate::error::StorageError;
use crate::hooks::RecordSnapshot;
use crate::models::{ConfigRecord, new_record_id};
use crate::traits::ConfigRecordStore;

#[async_trait::async_trait]
impl ConfigRecordStore for InMemoryRecordStore {
    async fn find_config_record(
        &self,
        device_id: &str,
    ) -> Result<Option<ConfigRecord>, StorageError> {
        let tables = self.read()?;
        Ok(tables.config_records.get(device_id).cloned())
    }

    async fn bump_config_version(&self, device_id: &str) -> Result<ConfigRecord, StorageError> {
        let (previous, current) = {
            let mut tables = self.write()?;
            Self::ensure_device(&tables, device_id)?;
            let previous = tables.config_records.get(device_id).cloned();
            let record = tables
                .config_records
                .entry(device_id.to_string())
                .or_insert_with(|| ConfigRecord {
                    config_id: new_record_id(),
                    device_id: device_id.to_string(),
                    version: 0,
                });
            record.version = record.version.saturating_add(1);
            (previous, record.clone())
        };
        let snapshot = RecordSnapshot::ConfigRecord(current.clone());
        match previous {
            Some(previous) => {
                self.hooks
                    .after_update(&RecordSnapshot::ConfigRecord(previous), &snapshot)
                    .await?
            }
            None => self.hooks.after_create(&snapshot).await?,
        }
        Ok(current)
    }

    async fn delete_config_record(&self, device_id: &str) -> Result<bool, StorageError> {
        let Some(record) = self.find_config_record(device_id).await? else {
            return Ok(false);
        };
        let snapshot = RecordSnapshot::ConfigRecord(record);
        self.hooks.before_delete(&snapshot).await?;
        let removed = {
            let mut tables = self.write()?;
            tables.config_records.remove(device_id).is_some()
        };
        if !removed {
            return Ok(false);
        }
        self.hooks.after_delete(&snapshot).await?;
        Ok(true)
    }
}
