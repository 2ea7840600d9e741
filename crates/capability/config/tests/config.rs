use smaas_config::{AppConfig, ConfigError};

// 环境变量是进程级状态，全部断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    let config = AppConfig::from_env().expect("defaults");
    assert_eq!(config.mqtt_host, "127.0.0.1");
    assert_eq!(config.mqtt_port, 1883);
    assert_eq!(config.mqtt_root_topic, "arduino");
    assert_eq!(config.mqtt_publish_qos, 0);
    assert!(!config.config_per_kind_topics);
    assert_eq!(config.relay_resync_delay_ms, 50);
    assert_eq!(config.relay_resync_page_size, 32);
    assert_eq!(config.max_payload_bytes, 1024);
    assert!(config.mqtt_username.is_none());
    assert!(config.seed_devices.is_empty());

    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("SMAAS_MQTT_ROOT_TOPIC", "greenhouse");
        std::env::set_var("SMAAS_MQTT_PUBLISH_QOS", "1");
        std::env::set_var("SMAAS_CONFIG_PER_KIND_TOPICS", "true");
        std::env::set_var("SMAAS_MQTT_USERNAME", "");
        std::env::set_var("SMAAS_SEED_DEVICES", " board-1, ,board-2,");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.mqtt_root_topic, "greenhouse");
    assert_eq!(config.mqtt_publish_qos, 1);
    assert!(config.config_per_kind_topics);
    assert!(config.mqtt_username.is_none());
    assert_eq!(config.seed_devices, vec!["board-1".to_string(), "board-2".to_string()]);

    unsafe {
        std::env::set_var("SMAAS_MQTT_PUBLISH_QOS", "2");
    }
    let err = AppConfig::from_env().expect_err("qos 2");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "SMAAS_MQTT_PUBLISH_QOS"));

    unsafe {
        std::env::set_var("SMAAS_MQTT_PUBLISH_QOS", "0");
        std::env::set_var("SMAAS_RELAY_RESYNC_PAGE_SIZE", "zero");
    }
    assert!(AppConfig::from_env().is_err());
}
