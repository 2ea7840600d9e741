//! 数据模型
//!
//! 定义网关读写的所有记录：
//! - 设备：DeviceRecord
//! - 期望状态：ConfigRecord（版本号）、SensorConfigRecord（按种类的传感器配置）
//! - 观测状态：RelayPortBinding.state、TelemetryRecord
//! - 安全：SecurityCredential、AccessLogRecord
//!
//! 期望状态与观测状态不可混用：配置同步只读前者，继电器桥接与遥测只写后者。

use domain::{DutyClass, SensorKind};

/// 生成新的记录 ID。
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 设备记录，所有设备级数据的根。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub device_id: String,
    /// 所属账户
    pub account_id: String,
    pub name: String,
    pub status: String,
}

/// 设备配置记录（每设备一条），版本号单调递增。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub config_id: String,
    pub device_id: String,
    pub version: u32,
}

/// 传感器配置记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfigRecord {
    pub config_id: String,
    pub device_id: String,
    /// 在 (设备, 种类) 内唯一
    pub sensor_id: u32,
    pub label: String,
    pub settings: SensorSettings,
}

impl SensorConfigRecord {
    pub fn new(
        device_id: impl Into<String>,
        sensor_id: u32,
        label: impl Into<String>,
        settings: SensorSettings,
    ) -> Self {
        Self {
            config_id: new_record_id(),
            device_id: device_id.into(),
            sensor_id,
            label: label.into(),
            settings,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.settings.kind()
    }
}

/// 按种类区分的传感器硬件设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSettings {
    Climate {
        dht22_port: u8,
        aqi_port: u8,
        has_buzzer: bool,
        /// 仅在 `has_buzzer` 为 true 时有意义
        buzzer_port: Option<u8>,
    },
    Light {
        port: u8,
    },
    Motion {
        port: u8,
        /// 存储中的负载类型编码（1 = 低负载，2 = 重负载）
        relay_type: u8,
        relay_port: u8,
    },
}

impl SensorSettings {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorSettings::Climate { .. } => SensorKind::Climate,
            SensorSettings::Light { .. } => SensorKind::Light,
            SensorSettings::Motion { .. } => SensorKind::Motion,
        }
    }

    /// 该传感器占用的硬件端口。
    pub fn occupied_ports(&self) -> Vec<u8> {
        match self {
            SensorSettings::Climate {
                dht22_port,
                aqi_port,
                has_buzzer,
                buzzer_port,
            } => {
                let mut ports = vec![*dht22_port, *aqi_port];
                if *has_buzzer {
                    ports.extend(*buzzer_port);
                }
                ports
            }
            SensorSettings::Light { port } => vec![*port],
            SensorSettings::Motion { port, .. } => vec![*port],
        }
    }
}

/// 传感器配置更新输入。
#[derive(Debug, Clone, Default)]
pub struct SensorConfigUpdate {
    pub label: Option<String>,
    /// 种类必须与原记录一致
    pub settings: Option<SensorSettings>,
}

/// 继电器端口绑定（每个物理端口一条）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPortBinding {
    pub binding_id: String,
    pub device_id: String,
    /// 引用的共享夹具
    pub duty: DutyClass,
    pub port: u8,
    pub state: bool,
    pub label: String,
}

impl RelayPortBinding {
    /// 新开通的端口：默认关闭，标签为 `Relay N`。
    pub fn provisioned(device_id: impl Into<String>, duty: DutyClass, port: u8) -> Self {
        Self {
            binding_id: new_record_id(),
            device_id: device_id.into(),
            duty,
            port,
            state: false,
            label: format!("Relay {}", port),
        }
    }

    pub fn fixture_id(&self) -> &'static str {
        self.duty.fixture_id()
    }
}

/// 继电器端口更新输入。
#[derive(Debug, Clone, Default)]
pub struct RelayPortUpdate {
    pub state: Option<bool>,
    pub label: Option<String>,
}

impl RelayPortUpdate {
    pub fn state(state: bool) -> Self {
        Self {
            state: Some(state),
            label: None,
        }
    }
}

/// RFID 凭据记录。
///
/// 记录先于凭据值存在：`credential_id` 同时是注册握手的关联 ID，
/// 注册完成前 `credential` 为空串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityCredential {
    pub credential_id: String,
    pub device_id: String,
    /// 十六进制编码的卡片 UID
    pub credential: String,
}

impl SecurityCredential {
    pub fn pending(device_id: impl Into<String>) -> Self {
        Self {
            credential_id: new_record_id(),
            device_id: device_id.into(),
            credential: String::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.credential.is_empty()
    }
}

/// 遥测读数（只追加）。
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub reading_id: String,
    pub device_id: String,
    pub sensor_id: u32,
    pub recorded_at_ms: i64,
    pub measurement: Measurement,
}

/// 读数内容。
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Climate {
        temperature: f64,
        humidity: f64,
        air_quality: f64,
    },
    LightLevel {
        value: f64,
    },
    Motion {
        detected: bool,
    },
}

impl Measurement {
    pub fn kind(&self) -> SensorKind {
        match self {
            Measurement::Climate { .. } => SensorKind::Climate,
            Measurement::LightLevel { .. } => SensorKind::Light,
            Measurement::Motion { .. } => SensorKind::Motion,
        }
    }
}

/// 刷卡校验日志（只追加）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogRecord {
    pub log_id: String,
    pub device_id: String,
    /// 十六进制编码的卡片 UID
    pub credential: String,
    pub granted: bool,
    pub detail: String,
    pub ts_ms: i64,
}
