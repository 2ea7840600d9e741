//! 设备同步网关进程：装配存储、MQTT 收发与网关组件。

mod wiring;

use smaas_config::AppConfig;
use smaas_telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    info!(
        target: "smaas.gateway",
        mqtt_host = %config.mqtt_host,
        mqtt_port = config.mqtt_port,
        root_topic = %config.mqtt_root_topic,
        "gateway_starting"
    );
    wiring::run(&config).await?;
    Ok(())
}
