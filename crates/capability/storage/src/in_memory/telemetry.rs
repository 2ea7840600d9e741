use super::{InMemoryRecordStore, apply_limit};
use crate::error::StorageError;
use crate::models::TelemetryRecord;
use crate::traits::TelemetryStore;

#[async_trait::async_trait]
impl TelemetryStore for InMemoryRecordStore {
    async fn append_reading(
        &self,
        record: TelemetryRecord,
    ) -> Result<TelemetryRecord, StorageError> {
        let mut tables = self.write()?;
        Self::ensure_device(&tables, &record.device_id)?;
        tables.readings.push(record.clone());
        Ok(record)
    }

    async fn list_readings(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<TelemetryRecord>, StorageError> {
        let tables = self.read()?;
        let mut items: Vec<TelemetryRecord> = tables
            .readings
            .iter()
            .rev()
            .filter(|item| item.device_id == device_id)
            .cloned()
            .collect();
        apply_limit(&mut items, limit);
        Ok(items)
    }
}
