//! RFID 凭据存储实现

use super::InMemoryRecordStore;
use crate::error::StorageError;
use crate::hooks::RecordSnapshot;
use crate::models::SecurityCredential;
use crate::traits::CredentialStore;

#[async_trait::async_trait]
impl CredentialStore for InMemoryRecordStore {
    async fn create_credential(
        &self,
        record: SecurityCredential,
    ) -> Result<SecurityCredential, StorageError> {
        {
            let mut tables = self.write()?;
            Self::ensure_device(&tables, &record.device_id)?;
            let exists = tables.credentials.contains_key(&record.credential_id)
                || tables
                    .credentials
                    .values()
                    .any(|item| item.device_id == record.device_id);
            if exists {
                return Err(StorageError::conflict(format!(
                    "device {} already has a credential",
                    record.device_id
                )));
            }
            tables
                .credentials
                .insert(record.credential_id.clone(), record.clone());
        }
        self.hooks
            .after_create(&RecordSnapshot::Credential(record.clone()))
            .await?;
        Ok(record)
    }

    async fn find_credential(
        &self,
        credential_id: &str,
    ) -> Result<Option<SecurityCredential>, StorageError> {
        let tables = self.read()?;
        Ok(tables.credentials.get(credential_id).cloned())
    }

    async fn list_credentials(
        &self,
        device_id: &str,
    ) -> Result<Vec<SecurityCredential>, StorageError> {
        let tables = self.read()?;
        let items = tables
            .credentials
            .values()
            .filter(|item| item.device_id == device_id)
            .cloned()
            .collect();
        Ok(items)
    }

    async fn set_credential_value(
        &self,
        credential_id: &str,
        credential_hex: &str,
    ) -> Result<Option<SecurityCredential>, StorageError> {
        let (previous, current) = {
            let mut tables = self.write()?;
            let Some(item) = tables.credentials.get_mut(credential_id) else {
                return Ok(None);
            };
            let previous = item.clone();
            item.credential = credential_hex.to_string();
            (previous, item.clone())
        };
        self.hooks
            .after_update(
                &RecordSnapshot::Credential(previous),
                &RecordSnapshot::Credential(current.clone()),
            )
            .await?;
        Ok(Some(current))
    }

    async fn delete_credential(&self, credential_id: &str) -> Result<bool, StorageError> {
        let Some(record) = self.find_credential(credential_id).await? else {
            return Ok(false);
        };
        let snapshot = RecordSnapshot::Credential(record);
        self.hooks.before_delete(&snapshot).await?;
        let removed = {
            let mut tables = self.write()?;
            tables.credentials.remove(credential_id).is_some()
        };
        // 并发删除时只有实际移除记录的一方触发删除后钩子
        if !removed {
            return Ok(false);
        }
        self.hooks.after_delete(&snapshot).await?;
        Ok(true)
    }
}
