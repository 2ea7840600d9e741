//! 网关运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 网关运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    /// topic 根段，`<root>/<deviceId>/<suffix>`
    pub mqtt_root_topic: String,
    pub mqtt_subscribe_qos: u8,
    pub mqtt_publish_qos: u8,
    /// 配置快照按种类发布到 `config/<kind>`
    pub config_per_kind_topics: bool,
    /// 全量重同步时两条继电器报文之间的间隔
    pub relay_resync_delay_ms: u64,
    /// 全量重同步单次读取的端口上限
    pub relay_resync_page_size: usize,
    pub max_payload_bytes: usize,
    /// 启动时写入内存存储的设备 id
    pub seed_devices: Vec<String>,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mqtt_host = env::var("SMAAS_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("SMAAS_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("SMAAS_MQTT_USERNAME");
        let mqtt_password = read_optional("SMAAS_MQTT_PASSWORD");
        let mqtt_root_topic =
            env::var("SMAAS_MQTT_ROOT_TOPIC").unwrap_or_else(|_| "arduino".to_string());
        if mqtt_root_topic.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid(
                "SMAAS_MQTT_ROOT_TOPIC".to_string(),
                mqtt_root_topic,
            ));
        }
        let mqtt_subscribe_qos = read_qos_with_default("SMAAS_MQTT_SUBSCRIBE_QOS", 0)?;
        let mqtt_publish_qos = read_qos_with_default("SMAAS_MQTT_PUBLISH_QOS", 0)?;
        let config_per_kind_topics = read_bool_with_default("SMAAS_CONFIG_PER_KIND_TOPICS", false);
        let relay_resync_delay_ms = read_u64_with_default("SMAAS_RELAY_RESYNC_DELAY_MS", 50)?;
        let relay_resync_page_size =
            read_u64_with_default("SMAAS_RELAY_RESYNC_PAGE_SIZE", 32)?;
        if relay_resync_page_size == 0 {
            return Err(ConfigError::Invalid(
                "SMAAS_RELAY_RESYNC_PAGE_SIZE".to_string(),
                "0".to_string(),
            ));
        }
        let max_payload_bytes = read_u64_with_default("SMAAS_MAX_PAYLOAD_BYTES", 1024)?;
        let seed_devices = read_list("SMAAS_SEED_DEVICES");

        Ok(Self {
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_root_topic,
            mqtt_subscribe_qos,
            mqtt_publish_qos,
            config_per_kind_topics,
            relay_resync_delay_ms,
            relay_resync_page_size: relay_resync_page_size as usize,
            max_payload_bytes: max_payload_bytes as usize,
            seed_devices,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 设备侧只支持 QoS 0/1。
fn read_qos_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<u8>() {
        Ok(qos) if qos <= 1 => Ok(qos),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// 逗号分隔，忽略空项。
fn read_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
