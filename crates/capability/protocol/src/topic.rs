//! topic 布局
//!
//! 形如 `<root>/<deviceId>/<suffix>`，设备 ID 固定为第二段，
//! suffix 可以包含多段（例如 `relay/full`、`config/remove`）。

use crate::error::ProtocolError;
use domain::SensorKind;

/// 消息通道（topic suffix）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Climate,
    Ldr,
    Motion,
    /// 任意种类的遥测
    Sensors,
    Relay,
    RelayFull,
    Rfid,
    Auth,
    Config,
    /// 按种类拆分的配置 topic
    ConfigKind(SensorKind),
    ConfigRemove,
}

impl Channel {
    /// 网关订阅的上行通道。
    pub const INBOUND: [Channel; 8] = [
        Channel::Climate,
        Channel::Ldr,
        Channel::Motion,
        Channel::Sensors,
        Channel::Relay,
        Channel::RelayFull,
        Channel::Rfid,
        Channel::Auth,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Channel::Climate => "climate",
            Channel::Ldr => "ldr",
            Channel::Motion => "motion",
            Channel::Sensors => "sensors",
            Channel::Relay => "relay",
            Channel::RelayFull => "relay/full",
            Channel::Rfid => "rfid",
            Channel::Auth => "auth",
            Channel::Config => "config",
            Channel::ConfigKind(SensorKind::Climate) => "config/climate",
            Channel::ConfigKind(SensorKind::Light) => "config/ldr",
            Channel::ConfigKind(SensorKind::Motion) => "config/motion",
            Channel::ConfigRemove => "config/remove",
        }
    }

    /// 遥测通道约束的传感器种类；`sensors` 接受任意种类。
    pub fn sensor_kind(self) -> Option<SensorKind> {
        match self {
            Channel::Climate => Some(SensorKind::Climate),
            Channel::Ldr => Some(SensorKind::Light),
            Channel::Motion => Some(SensorKind::Motion),
            _ => None,
        }
    }
}

/// topic 拆分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicParts<'a> {
    pub root: &'a str,
    pub device_id: &'a str,
    pub suffix: &'a str,
}

impl<'a> TopicParts<'a> {
    /// 拆分 topic；少于两段或设备 ID 为空时失败。
    pub fn parse(topic: &'a str) -> Result<Self, ProtocolError> {
        let mut parts = topic.splitn(3, '/');
        let root = parts.next().unwrap_or_default();
        let device_id = match parts.next() {
            Some(device_id) if !device_id.is_empty() => device_id,
            _ => return Err(ProtocolError::Topic(topic.to_string())),
        };
        let suffix = parts.next().unwrap_or_default();
        Ok(Self {
            root,
            device_id,
            suffix,
        })
    }
}

/// topic 生成器
#[derive(Debug, Clone)]
pub struct TopicLayout {
    root: String,
}

impl TopicLayout {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            root: root.trim_matches('/').to_string(),
        }
    }

    /// 某设备某通道的完整 topic
    pub fn topic(&self, device_id: &str, channel: Channel) -> String {
        format!("{}/{}/{}", self.root, device_id, channel.suffix())
    }

    /// 所有设备某 suffix 的订阅过滤器
    pub fn subscription(&self, suffix: &str) -> String {
        format!("{}/+/{}", self.root, suffix.trim_matches('/'))
    }
}
