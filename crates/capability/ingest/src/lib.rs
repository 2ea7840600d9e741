//! 上行接入：订阅设备 topic 并把每条消息交给处理器。

use async_trait::async_trait;
use domain::InboundMessage;
use smaas_protocol::now_epoch_ms;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// 上行消息处理器。
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: InboundMessage) -> Result<(), IngestError>;
}

/// 接入源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn MessageHandler>) -> Result<(), IngestError>;
}

/// 占位源（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopSource;

#[async_trait]
impl Source for NoopSource {
    async fn run(&self, _handler: Arc<dyn MessageHandler>) -> Result<(), IngestError> {
        Ok(())
    }
}

/// MQTT 接入源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 订阅过滤器，如 `arduino/+/climate`
    pub subscriptions: Vec<String>,
    pub qos: rumqttc::QoS,
}

/// MQTT 接入源。
///
/// 每条 PUBLISH 在独立任务上处理，处理器之间不保证顺序。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(&self, handler: Arc<dyn MessageHandler>) -> Result<(), IngestError> {
        let client_id = format!("smaas-gateway-ingest-{}", uuid::Uuid::new_v4().simple());
        let mut options =
            rumqttc::MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = rumqttc::AsyncClient::new(options, 64);
        for filter in &self.config.subscriptions {
            client
                .subscribe(filter.as_str(), self.config.qos)
                .await
                .map_err(|err| IngestError::Source(err.to_string()))?;
            debug!(target: "smaas.ingest", filter = %filter, "mqtt_subscribed");
        }

        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    let message = InboundMessage::new(
                        publish.topic,
                        publish.payload.to_vec(),
                        now_epoch_ms(),
                    );
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let topic = message.topic.clone();
                        if let Err(err) = handler.handle(message).await {
                            warn!(target: "smaas.ingest", topic = %topic, error = %err, "inbound_handler_failed");
                        }
                    });
                }
                Ok(_) => {}
                Err(err) => return Err(IngestError::Source(err.to_string())),
            }
        }
    }
}
