use super::{InMemoryRecordStore, apply_limit};
use crate::error::StorageError;
use crate::models::AccessLogRecord;
use crate::traits::AccessLogStore;

#[async_trait::async_trait]
impl AccessLogStore for InMemoryRecordStore {
    async fn append_access_log(
        &self,
        record: AccessLogRecord,
    ) -> Result<AccessLogRecord, StorageError> {
        let mut tables = self.write()?;
        Self::ensure_device(&tables, &record.device_id)?;
        tables.access_logs.push(record.clone());
        Ok(record)
    }

    async fn list_access_logs(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<AccessLogRecord>, StorageError> {
        let tables = self.read()?;
        let mut items: Vec<AccessLogRecord> = tables
            .access_logs
            .iter()
            .rev()
            .filter(|item| item.device_id == device_id)
            .cloned()
            .collect();
        apply_limit(&mut items, limit);
        Ok(items)
    }
}
