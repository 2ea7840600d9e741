//! 存储接口 Trait 定义
//!
//! 定义网关用到的全部记录存储接口：
//! - DeviceStore：设备存储（删除级联）
//! - ConfigRecordStore：设备配置版本
//! - SensorConfigStore：传感器配置
//! - RelayPortStore：继电器端口绑定
//! - CredentialStore：RFID 凭据
//! - TelemetryStore：遥测读数
//! - AccessLogStore：刷卡校验日志
//! - RecordEvents：记录变更订阅
//! - RecordStore：以上全部接口的组合，供网关持有
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 列表接口的 `limit` 为 0 表示不限
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::hooks::RecordObserver;
use crate::models::{
    AccessLogRecord, ConfigRecord, DeviceRecord, RelayPortBinding, RelayPortUpdate,
    SecurityCredential, SensorConfigRecord, SensorConfigUpdate, TelemetryRecord,
};
use async_trait::async_trait;
use domain::{DutyClass, SensorKind};
use std::sync::Arc;

/// 设备存储接口
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 创建设备（触发 after_create 钩子）
    async fn create_device(&self, record: DeviceRecord) -> Result<DeviceRecord, StorageError>;

    /// 查找设备
    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError>;

    /// 列出所有设备
    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, StorageError>;

    /// 删除设备及其全部从属记录
    async fn delete_device(&self, device_id: &str) -> Result<bool, StorageError>;
}

/// 设备配置版本存储接口
#[async_trait]
pub trait ConfigRecordStore: Send + Sync {
    /// 查找设备的配置记录
    async fn find_config_record(
        &self,
        device_id: &str,
    ) -> Result<Option<ConfigRecord>, StorageError>;

    /// 版本号加一并返回新记录；记录不存在时以版本 1 创建
    async fn bump_config_version(&self, device_id: &str) -> Result<ConfigRecord, StorageError>;

    /// 删除设备的配置记录
    async fn delete_config_record(&self, device_id: &str) -> Result<bool, StorageError>;
}

/// 传感器配置存储接口
#[async_trait]
pub trait SensorConfigStore: Send + Sync {
    /// 创建传感器配置（写入前校验传感器 ID 与端口唯一性）
    async fn create_sensor_config(
        &self,
        record: SensorConfigRecord,
    ) -> Result<SensorConfigRecord, StorageError>;

    /// 查找传感器配置
    async fn find_sensor_config(
        &self,
        config_id: &str,
    ) -> Result<Option<SensorConfigRecord>, StorageError>;

    /// 列出设备的传感器配置，按传感器 ID 降序
    async fn list_sensor_configs(
        &self,
        device_id: &str,
        kind: Option<SensorKind>,
        limit: usize,
    ) -> Result<Vec<SensorConfigRecord>, StorageError>;

    /// 更新传感器配置
    async fn update_sensor_config(
        &self,
        config_id: &str,
        update: SensorConfigUpdate,
    ) -> Result<Option<SensorConfigRecord>, StorageError>;

    /// 删除传感器配置
    async fn delete_sensor_config(&self, config_id: &str) -> Result<bool, StorageError>;
}

/// 继电器端口存储接口
#[async_trait]
pub trait RelayPortStore: Send + Sync {
    /// 创建端口绑定（校验端口在夹具范围内且槽位未被占用）
    async fn create_relay_port(
        &self,
        record: RelayPortBinding,
    ) -> Result<RelayPortBinding, StorageError>;

    /// 按 ID 查找
    async fn find_relay_port(
        &self,
        binding_id: &str,
    ) -> Result<Option<RelayPortBinding>, StorageError>;

    /// 按 (设备, 负载类型, 端口) 查找唯一绑定
    async fn find_relay_port_by_slot(
        &self,
        device_id: &str,
        duty: DutyClass,
        port: u8,
    ) -> Result<Option<RelayPortBinding>, StorageError>;

    /// 按 (负载类型, 端口) 分页列出设备的端口绑定，从第 `offset` 条开始
    async fn list_relay_ports(
        &self,
        device_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RelayPortBinding>, StorageError>;

    /// 更新端口绑定（触发 after_update 钩子）
    async fn update_relay_port(
        &self,
        binding_id: &str,
        update: RelayPortUpdate,
    ) -> Result<Option<RelayPortBinding>, StorageError>;
}

/// RFID 凭据存储接口
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 创建凭据记录（每设备一条）
    async fn create_credential(
        &self,
        record: SecurityCredential,
    ) -> Result<SecurityCredential, StorageError>;

    /// 按 ID 查找
    async fn find_credential(
        &self,
        credential_id: &str,
    ) -> Result<Option<SecurityCredential>, StorageError>;

    /// 列出设备的凭据记录
    async fn list_credentials(
        &self,
        device_id: &str,
    ) -> Result<Vec<SecurityCredential>, StorageError>;

    /// 写入十六进制凭据值
    async fn set_credential_value(
        &self,
        credential_id: &str,
        credential_hex: &str,
    ) -> Result<Option<SecurityCredential>, StorageError>;

    /// 删除凭据记录
    async fn delete_credential(&self, credential_id: &str) -> Result<bool, StorageError>;
}

/// 遥测存储接口
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// 追加一条读数
    async fn append_reading(&self, record: TelemetryRecord)
    -> Result<TelemetryRecord, StorageError>;

    /// 列出设备读数，最新在前
    async fn list_readings(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<TelemetryRecord>, StorageError>;
}

/// 访问日志存储接口
#[async_trait]
pub trait AccessLogStore: Send + Sync {
    /// 追加一条校验日志
    async fn append_access_log(
        &self,
        record: AccessLogRecord,
    ) -> Result<AccessLogRecord, StorageError>;

    /// 列出设备的校验日志，最新在前
    async fn list_access_logs(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<AccessLogRecord>, StorageError>;
}

/// 记录变更订阅
pub trait RecordEvents: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn RecordObserver>);
}

/// 网关使用的完整记录存储
pub trait RecordStore:
    DeviceStore
    + ConfigRecordStore
    + SensorConfigStore
    + RelayPortStore
    + CredentialStore
    + TelemetryStore
    + AccessLogStore
    + RecordEvents
{
}

impl<T> RecordStore for T where
    T: DeviceStore
        + ConfigRecordStore
        + SensorConfigStore
        + RelayPortStore
        + CredentialStore
        + TelemetryStore
        + AccessLogStore
        + RecordEvents
{
}
