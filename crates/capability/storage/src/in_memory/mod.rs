//! 内存存储实现模块
//!
//! 用于测试和单机部署。所有记录放在同一把 `RwLock` 之后，
//! 以便设备删除时跨记录类型级联。
//!
//! 包含以下实现：
//! - DeviceStore / ConfigRecordStore / SensorConfigStore
//! - RelayPortStore / CredentialStore
//! - TelemetryStore / AccessLogStore
//! - RecordEvents
//!
//! 约束：钩子一律在释放锁之后调用。

mod access_log;
mod config_record;
mod credential;
mod device;
mod relay_port;
mod sensor_config;
mod telemetry;

use crate::error::StorageError;
use crate::hooks::{RecordHooks, RecordObserver};
use crate::models::{
    AccessLogRecord, ConfigRecord, DeviceRecord, RelayPortBinding, SecurityCredential,
    SensorConfigRecord, TelemetryRecord,
};
use crate::traits::RecordEvents;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    devices: HashMap<String, DeviceRecord>,
    /// 正在级联删除的设备，不再接受新的从属记录
    deleting: HashSet<String>,
    /// 按 device_id 索引
    config_records: HashMap<String, ConfigRecord>,
    sensor_configs: HashMap<String, SensorConfigRecord>,
    relay_ports: HashMap<String, RelayPortBinding>,
    credentials: HashMap<String, SecurityCredential>,
    readings: Vec<TelemetryRecord>,
    access_logs: Vec<AccessLogRecord>,
}

/// 记录存储内存实现
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    hooks: RecordHooks,
}

impl InMemoryRecordStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 生命周期钩子注册表
    pub fn hooks(&self) -> &RecordHooks {
        &self.hooks
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::new("lock failed"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::new("lock failed"))
    }

    fn ensure_device(tables: &Tables, device_id: &str) -> Result<(), StorageError> {
        if !tables.devices.contains_key(device_id) || tables.deleting.contains(device_id) {
            return Err(StorageError::not_found(format!(
                "device {} not found",
                device_id
            )));
        }
        Ok(())
    }
}

impl RecordEvents for InMemoryRecordStore {
    fn subscribe(&self, observer: Arc<dyn RecordObserver>) {
        self.hooks.register(observer);
    }
}

fn apply_page<T>(items: &mut Vec<T>, offset: usize, limit: usize) {
    items.drain(..offset.min(items.len()));
    apply_limit(items, limit);
}

fn apply_limit<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 && items.len() > limit {
        items.truncate(limit);
    }
}
