//! 报文类型定义
//!
//! 所有跨线传输的结构。数值宽度按设备侧内存约束选取，
//! 字段含义与可选性才是契约的一部分。

use domain::{DutyClass, SensorKind, SwitchState};
use serde::{Deserialize, Serialize};

// ============================================================================
// 上行遥测
// ============================================================================

/// 遥测报文：一条报文只携带一个读数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorData {
    Climate(ClimateReading),
    Light(LightReading),
    Motion(MotionReading),
}

impl SensorData {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorData::Climate(_) => SensorKind::Climate,
            SensorData::Light(_) => SensorKind::Light,
            SensorData::Motion(_) => SensorKind::Motion,
        }
    }

    pub fn sensor_id(&self) -> u32 {
        match self {
            SensorData::Climate(reading) => reading.sensor_id,
            SensorData::Light(reading) => reading.sensor_id,
            SensorData::Motion(reading) => reading.sensor_id,
        }
    }
}

/// 温湿度与空气质量读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub sensor_id: u32,
    pub temperature: f32,
    pub humidity: f32,
    /// 空气质量指数
    pub aqi: f32,
}

/// 光照读数（LDR）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightReading {
    pub sensor_id: u32,
    pub level: f32,
}

/// 人体感应读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionReading {
    pub sensor_id: u32,
    pub detected: bool,
}

// ============================================================================
// 继电器
// ============================================================================

/// 继电器端口状态（上下行共用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayState {
    pub duty: DutyClass,
    pub port: u8,
    pub state: SwitchState,
}

// ============================================================================
// RFID 安全握手
// ============================================================================

/// RFID 报文信封。
///
/// 协议约定：注册请求与注册响应共享同一个关联 ID，
/// 即存储中凭据记录自身的 ID，网关不另行生成请求 ID。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfidEnvelope {
    /// 下行：请求设备扫描一张新卡并绑定到该凭据记录。
    RegisterRequest { id: String },
    /// 上行：设备回传扫描到的 UID。
    RegisterResponse { id: String, credential: Vec<u8> },
    /// 下行：从设备本地白名单移除该 UID，不等待响应。
    RevokeRequest { credential: Vec<u8> },
    /// 上行：设备请求校验刷到的卡。
    VerifyRequest { credential: Vec<u8> },
    /// 下行：注册或校验结果。
    Status { granted: bool },
}

impl RfidEnvelope {
    /// 用于日志的报文种类名。
    pub fn kind_name(&self) -> &'static str {
        match self {
            RfidEnvelope::RegisterRequest { .. } => "register_request",
            RfidEnvelope::RegisterResponse { .. } => "register_response",
            RfidEnvelope::RevokeRequest { .. } => "revoke_request",
            RfidEnvelope::VerifyRequest { .. } => "verify_request",
            RfidEnvelope::Status { .. } => "status",
        }
    }
}

// ============================================================================
// 下行配置
// ============================================================================

/// 单个传感器配置的下发报文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPush {
    /// 设备配置版本，设备据此判断本地配置是否落后。
    pub version: u32,
    pub sensor: SensorSnapshot,
}

/// 传感器配置快照（按种类区分）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorSnapshot {
    Climate(ClimateConfig),
    Light(LightConfig),
    Motion(MotionConfig),
}

impl SensorSnapshot {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorSnapshot::Climate(_) => SensorKind::Climate,
            SensorSnapshot::Light(_) => SensorKind::Light,
            SensorSnapshot::Motion(_) => SensorKind::Motion,
        }
    }

    pub fn sensor_id(&self) -> u32 {
        match self {
            SensorSnapshot::Climate(config) => config.sensor_id,
            SensorSnapshot::Light(config) => config.sensor_id,
            SensorSnapshot::Motion(config) => config.sensor_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateConfig {
    pub sensor_id: u32,
    pub dht22_port: u8,
    pub aqi_port: u8,
    /// 仅在装有蜂鸣器时存在。
    pub buzzer_port: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightConfig {
    pub sensor_id: u32,
    pub port: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionConfig {
    pub sensor_id: u32,
    pub port: u8,
    /// 触发的继电器
    pub relay_duty: DutyClass,
    pub relay_port: u8,
}

/// 传感器移除报文，只携带被撤回的传感器 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigRemoval {
    Climate { sensor_id: u32 },
    Light { sensor_id: u32 },
    Motion { sensor_id: u32 },
}

impl ConfigRemoval {
    pub fn new(kind: SensorKind, sensor_id: u32) -> Self {
        match kind {
            SensorKind::Climate => ConfigRemoval::Climate { sensor_id },
            SensorKind::Light => ConfigRemoval::Light { sensor_id },
            SensorKind::Motion => ConfigRemoval::Motion { sensor_id },
        }
    }

    pub fn kind(&self) -> SensorKind {
        match self {
            ConfigRemoval::Climate { .. } => SensorKind::Climate,
            ConfigRemoval::Light { .. } => SensorKind::Light,
            ConfigRemoval::Motion { .. } => SensorKind::Motion,
        }
    }

    pub fn sensor_id(&self) -> u32 {
        match self {
            ConfigRemoval::Climate { sensor_id }
            | ConfigRemoval::Light { sensor_id }
            | ConfigRemoval::Motion { sensor_id } => *sensor_id,
        }
    }
}

/// 当前毫秒时间戳
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
