//! 记录生命周期钩子
//!
//! 网关通过 [`RecordObserver`] 订阅存储的变更：
//!
//! | 阶段 | 触发时机 | 返回错误的效果 |
//! |---|---|---|
//! | `after_create` | 记录写入后 | 错误透传给写入方 |
//! | `after_update` | 记录更新后 | 错误透传给写入方 |
//! | `before_delete` | 删除前 | 中止删除 |
//! | `after_delete` | 删除后，快照仍可读 | 错误透传给删除方 |
//!
//! 观察者按注册顺序执行，只会收到其 `kinds()` 声明的记录类型。

use crate::error::StorageError;
use crate::models::{
    ConfigRecord, DeviceRecord, RelayPortBinding, SecurityCredential, SensorConfigRecord,
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// 触发钩子的记录类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Device,
    ConfigRecord,
    SensorConfig,
    RelayPort,
    Credential,
}

/// 记录的不可变快照。
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSnapshot {
    Device(DeviceRecord),
    ConfigRecord(ConfigRecord),
    SensorConfig(SensorConfigRecord),
    RelayPort(RelayPortBinding),
    Credential(SecurityCredential),
}

impl RecordSnapshot {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordSnapshot::Device(_) => RecordKind::Device,
            RecordSnapshot::ConfigRecord(_) => RecordKind::ConfigRecord,
            RecordSnapshot::SensorConfig(_) => RecordKind::SensorConfig,
            RecordSnapshot::RelayPort(_) => RecordKind::RelayPort,
            RecordSnapshot::Credential(_) => RecordKind::Credential,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            RecordSnapshot::Device(record) => &record.device_id,
            RecordSnapshot::ConfigRecord(record) => &record.config_id,
            RecordSnapshot::SensorConfig(record) => &record.config_id,
            RecordSnapshot::RelayPort(record) => &record.binding_id,
            RecordSnapshot::Credential(record) => &record.credential_id,
        }
    }

    /// 记录所属设备
    pub fn device_id(&self) -> &str {
        match self {
            RecordSnapshot::Device(record) => &record.device_id,
            RecordSnapshot::ConfigRecord(record) => &record.device_id,
            RecordSnapshot::SensorConfig(record) => &record.device_id,
            RecordSnapshot::RelayPort(record) => &record.device_id,
            RecordSnapshot::Credential(record) => &record.device_id,
        }
    }
}

/// 记录变更观察者
#[async_trait]
pub trait RecordObserver: Send + Sync {
    /// 用于日志的名称
    fn name(&self) -> &'static str;

    /// 关注的记录类型
    fn kinds(&self) -> &'static [RecordKind];

    async fn on_after_create(&self, _record: &RecordSnapshot) -> Result<(), StorageError> {
        Ok(())
    }

    async fn on_after_update(
        &self,
        _previous: &RecordSnapshot,
        _current: &RecordSnapshot,
    ) -> Result<(), StorageError> {
        Ok(())
    }

    async fn on_before_delete(&self, _record: &RecordSnapshot) -> Result<(), StorageError> {
        Ok(())
    }

    async fn on_after_delete(&self, _record: &RecordSnapshot) -> Result<(), StorageError> {
        Ok(())
    }
}

/// 观察者注册表
#[derive(Default)]
pub struct RecordHooks {
    observers: RwLock<Vec<Arc<dyn RecordObserver>>>,
}

impl RecordHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn RecordObserver>) {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(target: "smaas.storage", observer = observer.name(), "record_observer_registered");
        observers.push(observer);
    }

    pub async fn after_create(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        for observer in self.matching(record.kind()) {
            observer.on_after_create(record).await?;
        }
        Ok(())
    }

    pub async fn after_update(
        &self,
        previous: &RecordSnapshot,
        current: &RecordSnapshot,
    ) -> Result<(), StorageError> {
        for observer in self.matching(current.kind()) {
            observer.on_after_update(previous, current).await?;
        }
        Ok(())
    }

    pub async fn before_delete(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        for observer in self.matching(record.kind()) {
            observer.on_before_delete(record).await?;
        }
        Ok(())
    }

    pub async fn after_delete(&self, record: &RecordSnapshot) -> Result<(), StorageError> {
        for observer in self.matching(record.kind()) {
            observer.on_after_delete(record).await?;
        }
        Ok(())
    }

    /// 复制出匹配的观察者，回调期间不持有注册表锁。
    fn matching(&self, kind: RecordKind) -> Vec<Arc<dyn RecordObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|observer| observer.kinds().contains(&kind))
            .cloned()
            .collect()
    }
}
